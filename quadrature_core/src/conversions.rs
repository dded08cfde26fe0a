//! `From` implementations bridging `quadrature_config` types to `quadrature_core` types.

use crate::config::{CounterCfg, DecodeMode, DecoderCfg, SamplingCfg, VelocityCfg};

// ── DecodeMode ───────────────────────────────────────────────────────────────

impl From<quadrature_config::DecodeMode> for DecodeMode {
    fn from(m: quadrature_config::DecodeMode) -> Self {
        match m {
            quadrature_config::DecodeMode::Software => Self::Software,
            quadrature_config::DecodeMode::Hardware => Self::Hardware,
        }
    }
}

// ── DecoderCfg ───────────────────────────────────────────────────────────────

impl From<&quadrature_config::Config> for DecoderCfg {
    fn from(c: &quadrature_config::Config) -> Self {
        Self {
            min_edge_interval_us: c.filter.min_edge_interval_us,
            use_index: c.encoder.use_index && c.pins.index.is_some(),
        }
    }
}

// ── CounterCfg ───────────────────────────────────────────────────────────────

impl From<&quadrature_config::Config> for CounterCfg {
    fn from(c: &quadrature_config::Config) -> Self {
        Self {
            pulse_pin: c.pins.phase_a,
            ctrl_pin: c.pins.phase_b,
            limit: c.counter.limit,
            counts_per_pulse: c.counter.counts_per_pulse,
            filter_ns: c.counter.filter_ns,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&quadrature_config::SamplingCfg> for SamplingCfg {
    fn from(c: &quadrature_config::SamplingCfg) -> Self {
        Self {
            period_us: c.period_us,
        }
    }
}

// ── VelocityCfg ──────────────────────────────────────────────────────────────

impl From<&quadrature_config::Config> for VelocityCfg {
    fn from(c: &quadrature_config::Config) -> Self {
        let v = &c.velocity;
        Self {
            ema_alpha: v.ema_alpha,
            low_speed_cps: v.low_speed_cps,
            high_speed_cps: v.high_speed_cps,
            stall_timeout_us: v.stall_timeout_us,
            adaptive_blending: v.adaptive_blending,
            counts_per_rev: c.encoder.pulses_per_rev.saturating_mul(4),
        }
    }
}
