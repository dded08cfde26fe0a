//! Runtime configuration types for the encoder.
//!
//! These are separate from the TOML-deserialized config in `quadrature_config`.

/// Which decode path feeds the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Software,
    Hardware,
}

impl DecodeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Hardware => "hardware",
        }
    }
}

impl core::fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Software decoder settings.
#[derive(Debug, Clone, Copy)]
pub struct DecoderCfg {
    /// Edges closer than this to the last accepted edge are rejected.
    pub min_edge_interval_us: u64,
    /// Accept index notifications.
    pub use_index: bool,
}

impl Default for DecoderCfg {
    fn default() -> Self {
        Self {
            min_edge_interval_us: 10,
            use_index: true,
        }
    }
}

/// Pulse-counter peripheral settings for the hardware path.
#[derive(Debug, Clone, Copy)]
pub struct CounterCfg {
    pub pulse_pin: u8,
    pub ctrl_pin: u8,
    /// Symmetric wrap limit; also the range of one overflow step.
    pub limit: i32,
    /// Position counts per counted pulse.
    pub counts_per_pulse: u32,
    pub filter_ns: u32,
}

impl Default for CounterCfg {
    fn default() -> Self {
        Self {
            pulse_pin: 18,
            ctrl_pin: 19,
            limit: 32767,
            counts_per_pulse: 4,
            filter_ns: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SamplingCfg {
    /// Minimum time between two velocity ticks.
    pub period_us: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { period_us: 10_000 }
    }
}

/// Velocity engine settings.
#[derive(Debug, Clone, Copy)]
pub struct VelocityCfg {
    /// EMA coefficient in (0, 1].
    pub ema_alpha: f32,
    /// Below this |window rate| only the window rate is used.
    pub low_speed_cps: f32,
    /// Above this |window rate| the edge rate dominates (0.7 / 0.3).
    pub high_speed_cps: f32,
    /// Software path only; 0 disables stall detection.
    pub stall_timeout_us: u64,
    pub adaptive_blending: bool,
    /// Counts per mechanical revolution (x4 decoded).
    pub counts_per_rev: u32,
}

impl Default for VelocityCfg {
    fn default() -> Self {
        Self {
            ema_alpha: 0.4,
            low_speed_cps: 10.0,
            high_speed_cps: 1000.0,
            stall_timeout_us: 500_000,
            adaptive_blending: true,
            counts_per_rev: 4096,
        }
    }
}
