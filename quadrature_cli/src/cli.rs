//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "quadrature", version, about = "Quadrature encoder reader CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/quadrature.toml")]
    pub config: PathBuf,

    /// Print status lines and errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Decode path override; defaults to `counter.mode` from the config.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Table decoding of simulated phase lines
    Software,
    /// Simulated pulse-counter peripheral
    Hardware,
}

impl From<ModeArg> for quadrature_core::DecodeMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Software => Self::Software,
            ModeArg::Hardware => Self::Hardware,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a simulated encoder at a constant rate and print status lines
    Simulate {
        /// Signed rate in counts per second (negative runs in reverse)
        #[arg(long, allow_hyphen_values = true)]
        cps: f32,
        /// Simulated duration in seconds
        #[arg(long, default_value_t = 1.0)]
        seconds: f32,
        /// Decode path to simulate
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Also write every tick to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// Print only every Nth tick
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        every: u32,
        /// Override the sampling rate (Hz) from the config
        #[arg(long, value_name = "HZ")]
        sample_hz: Option<u32>,
        /// Run on the wall clock with a background sampler (Ctrl-C stops)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Run on the wall clock instead of virtual time.\n\nA background sampler thread ticks the encoder at the configured period while the main thread generates edges. Output is paced in real time and Ctrl-C stops the run early. Without this flag the run is deterministic and finishes as fast as the CPU allows."
        )]
        realtime: bool,
    },
    /// Line commands on stdin: ZERO, SET <n>, MOVE <n>, STATUS, QUIT
    Console {
        /// Decode path to simulate
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Validate config, build an encoder and exercise both decode paths
    SelfCheck,
}
