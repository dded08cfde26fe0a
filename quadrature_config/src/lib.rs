#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the quadrature encoder reader.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Only `[pins]` is mandatory; every other section falls back to the
//!   firmware defaults (1024 PPR, 10 ms sampling, 10 us glitch filter).
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Pins {
    pub phase_a: u8,
    pub phase_b: u8,
    /// Optional third channel pulsing once per revolution.
    pub index: Option<u8>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct EncoderCfg {
    /// Base pulses per revolution of one channel; counts per rev is 4x this.
    pub pulses_per_rev: u32,
    /// Arm the index channel when a pin is configured.
    pub use_index: bool,
}

impl Default for EncoderCfg {
    fn default() -> Self {
        Self {
            pulses_per_rev: 1024,
            use_index: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Interrupt-driven decoding through the transition table.
    #[default]
    Software,
    /// Edge counting delegated to a pulse-counter peripheral.
    Hardware,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CounterCfg {
    pub mode: DecodeMode,
    /// Symmetric peripheral limit; the counter wraps at +/- this value.
    pub limit: i32,
    /// Position counts per counted pulse (4 when one edge of one phase is counted).
    pub counts_per_pulse: u32,
    /// Peripheral glitch filter in nanoseconds.
    pub filter_ns: u32,
}

impl Default for CounterCfg {
    fn default() -> Self {
        Self {
            mode: DecodeMode::Software,
            limit: 32767,
            counts_per_pulse: 4,
            filter_ns: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SamplingCfg {
    /// Velocity sampling period in microseconds.
    pub period_us: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { period_us: 10_000 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FilterCfg {
    /// Edges closer than this to the last accepted edge are dropped.
    pub min_edge_interval_us: u64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            min_edge_interval_us: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct VelocityCfg {
    pub ema_alpha: f32,
    pub low_speed_cps: f32,
    pub high_speed_cps: f32,
    /// No accepted edge for this long forces the rate to zero (0 disables).
    pub stall_timeout_us: u64,
    /// Speed-regime weighting; when false both rates are averaged.
    pub adaptive_blending: bool,
}

impl Default for VelocityCfg {
    fn default() -> Self {
        Self {
            ema_alpha: 0.4,
            low_speed_cps: 10.0,
            high_speed_cps: 1000.0,
            stall_timeout_us: 500_000,
            adaptive_blending: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub encoder: EncoderCfg,
    #[serde(default)]
    pub counter: CounterCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub velocity: VelocityCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Counts per mechanical revolution after x4 decoding.
    pub fn counts_per_rev(&self) -> u64 {
        u64::from(self.encoder.pulses_per_rev) * 4
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.phase_a == self.pins.phase_b {
            eyre::bail!("pins.phase_a and pins.phase_b must differ");
        }
        if let Some(ix) = self.pins.index
            && (ix == self.pins.phase_a || ix == self.pins.phase_b)
        {
            eyre::bail!("pins.index must differ from the phase pins");
        }

        // Encoder
        if self.encoder.pulses_per_rev == 0 {
            eyre::bail!("encoder.pulses_per_rev must be > 0");
        }

        // Counter
        if self.counter.limit <= 0 {
            eyre::bail!("counter.limit must be > 0");
        }
        if self.counter.counts_per_pulse == 0 || self.counter.counts_per_pulse > 4 {
            eyre::bail!("counter.counts_per_pulse must be in [1, 4]");
        }
        if self.counter.filter_ns > 1_000_000 {
            eyre::bail!("counter.filter_ns is unreasonably large (>1ms)");
        }

        // Sampling
        if self.sampling.period_us == 0 {
            eyre::bail!("sampling.period_us must be > 0");
        }
        if self.sampling.period_us > 10_000_000 {
            eyre::bail!("sampling.period_us is unreasonably large (>10s)");
        }

        // Filter
        if self.filter.min_edge_interval_us >= self.sampling.period_us {
            eyre::bail!("filter.min_edge_interval_us must be < sampling.period_us");
        }

        // Velocity
        let v = &self.velocity;
        if !(v.ema_alpha > 0.0 && v.ema_alpha <= 1.0) {
            eyre::bail!("velocity.ema_alpha must be in (0.0, 1.0]");
        }
        if !v.low_speed_cps.is_finite() || v.low_speed_cps < 0.0 {
            eyre::bail!("velocity.low_speed_cps must be >= 0");
        }
        if !v.high_speed_cps.is_finite() || v.high_speed_cps < v.low_speed_cps {
            eyre::bail!("velocity.high_speed_cps must be >= velocity.low_speed_cps");
        }
        if v.stall_timeout_us != 0 && v.stall_timeout_us < self.sampling.period_us {
            eyre::bail!("velocity.stall_timeout_us must be 0 or >= sampling.period_us");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}
