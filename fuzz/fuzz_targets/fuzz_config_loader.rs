#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse or validation errors are fine; panics are not.
    if let Ok(cfg) = quadrature_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let _ = cfg.counts_per_rev();
        }
    }
});
