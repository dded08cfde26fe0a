//! Human-readable error descriptions and structured JSON error formatting.

use quadrature_core::error::{BuildError, EncoderError};

fn mentions_invalid_configuration(err: &eyre::Report) -> bool {
    err.chain()
        .any(|e| e.to_string().contains("invalid configuration"))
}

fn is_config_read_error(err: &eyre::Report) -> bool {
    err.downcast_ref::<std::io::Error>().is_some() && err.to_string().contains("config")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No signal source was provided to the encoder.\nLikely causes: Neither a phase input nor a pulse counter was wired into the builder.\nHow to fix: Pass one via with_phase_input(...) or with_pulse_counter(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ee) = err.downcast_ref::<EncoderError>() {
        return match ee {
            EncoderError::Config(msg) => format!(
                "What happened: The pulse counter rejected its setup ({msg}).\nLikely causes: counter.limit, counter.filter_ns or the pin pair is not supported by the unit.\nHow to fix: Adjust the [counter] and [pins] sections and try again."
            ),
            EncoderError::Hardware(msg) | EncoderError::HardwareFault(msg) => format!(
                "What happened: Pulse counter failure ({msg}).\nLikely causes: The counter unit is busy, missing, or the process lacks access to it.\nHow to fix: Check the wiring and permissions, or run with --mode software."
            ),
            EncoderError::Io(msg) => format!(
                "What happened: I/O error while talking to the counter ({msg}).\nLikely causes: Device node missing or permissions.\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML for this program.\nDetails: {}\nHow to fix: Fix the reported key or value; [pins] phase_a and phase_b are required.",
            te.message()
        );
    }

    if mentions_invalid_configuration(err) {
        return format!(
            "What happened: Configuration is invalid ({}).\nLikely causes: Out-of-range values or conflicting pins in the TOML.\nHow to fix: Edit the TOML config and try again.",
            err.root_cause()
        );
    }

    let msg = err.to_string();
    if is_config_read_error(err) {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing read permission.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for configuration problems, 3 for counter failures, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<toml::de::Error>().is_some()
        || err.downcast_ref::<BuildError>().is_some()
        || is_config_read_error(err)
        || matches!(
            err.downcast_ref::<EncoderError>(),
            Some(EncoderError::Config(_))
        )
        || mentions_invalid_configuration(err)
    {
        return 2;
    }
    if err.downcast_ref::<EncoderError>().is_some() {
        return 3;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "Config",
        3 => "Hardware",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
