//! Encoder assembly from config plus a simulated signal source.

use std::sync::Arc;

use quadrature_config::Config;
use quadrature_core::error::Result as CoreResult;
use quadrature_core::{
    CounterCfg, DecodeMode, DecoderCfg, EdgeHandle, Encoder, SamplingCfg, VelocityCfg,
};
use quadrature_hardware::{SimulatedPhases, SimulatedPulseCounter};
use quadrature_traits::Clock;

/// Whatever produces edges for the encoder in this process.
pub enum SimSource {
    Phases {
        lines: Arc<SimulatedPhases>,
        edges: EdgeHandle,
    },
    Counter {
        unit: Arc<SimulatedPulseCounter>,
        counts_per_pulse: u32,
        edges: EdgeHandle,
    },
}

impl SimSource {
    /// Move one quadrature count in `dir` (sign only). The counter source
    /// emits one pulse per `counts_per_pulse` calls.
    pub fn step(&self, dir: i8, carry: &mut u32) {
        match self {
            Self::Phases { lines, edges } => {
                lines.advance(dir);
                edges.on_phase_change();
            }
            Self::Counter {
                unit,
                counts_per_pulse,
                ..
            } => {
                *carry += 1;
                if *carry >= *counts_per_pulse {
                    *carry = 0;
                    unit.pulse(dir);
                }
            }
        }
    }

    /// Record a step with an explicit timestamp (used when edges are batched
    /// on the wall clock).
    pub fn step_at(&self, dir: i8, now_us: u64, carry: &mut u32) {
        match self {
            Self::Phases { lines, edges } => {
                let state = lines.advance(dir);
                edges.record_transition(state, now_us);
            }
            Self::Counter { .. } => self.step(dir, carry),
        }
    }

    pub fn pulse_index(&self) {
        match self {
            Self::Phases { edges, .. } | Self::Counter { edges, .. } => edges.on_index(),
        }
    }
}

/// Resolve the decode path: CLI override first, then `counter.mode`.
pub fn resolve_mode(cfg: &Config, cli: Option<DecodeMode>) -> DecodeMode {
    cli.unwrap_or_else(|| cfg.counter.mode.into())
}

/// Build and initialize an encoder over a simulated source.
pub fn build_encoder(
    cfg: &Config,
    mode: DecodeMode,
    clock: Box<dyn Clock + Send + Sync>,
    sampling_override: Option<SamplingCfg>,
) -> CoreResult<(Encoder, SimSource)> {
    let decoder: DecoderCfg = cfg.into();
    let counter: CounterCfg = cfg.into();
    let velocity: VelocityCfg = cfg.into();
    let sampling = sampling_override.unwrap_or_else(|| (&cfg.sampling).into());

    let (encoder, source) = match mode {
        DecodeMode::Software => {
            let lines = Arc::new(SimulatedPhases::new());
            let mut encoder = Encoder::builder()
                .with_phase_input(lines.clone())
                .with_decoder(decoder)
                .with_sampling(sampling)
                .with_velocity(velocity)
                .with_clock(clock)
                .build()?;
            encoder.initialize()?;
            let edges = encoder.edge_handle();
            (encoder, SimSource::Phases { lines, edges })
        }
        DecodeMode::Hardware => {
            let unit = Arc::new(SimulatedPulseCounter::new());
            let counts_per_pulse = counter.counts_per_pulse;
            let mut encoder = Encoder::builder()
                .with_pulse_counter(unit.clone())
                .with_decoder(decoder)
                .with_counter(counter)
                .with_sampling(sampling)
                .with_velocity(velocity)
                .with_clock(clock)
                .build()?;
            encoder.initialize()?;
            let edges = encoder.edge_handle();
            let source = SimSource::Counter {
                unit,
                counts_per_pulse,
                edges,
            };
            (encoder, source)
        }
    };
    tracing::info!(
        mode = %mode,
        counts_per_rev = encoder.counts_per_rev(),
        period_us = encoder.sampling_period_us(),
        "encoder ready"
    );
    Ok((encoder, source))
}

/// Startup summary printed by the interactive commands.
pub fn banner(cfg: &Config, encoder: &Encoder) -> String {
    let blending = if cfg.velocity.adaptive_blending {
        "adaptive window/edge blending"
    } else {
        "window/edge average"
    };
    format!(
        "Quadrature encoder reader\n\
         PPR={} CPR={} sample period={} us\n\
         Mode: {}\n\
         Velocity: {}\n\
         Glitch filter: {} us\n\
         Stall timeout: {} ms",
        cfg.encoder.pulses_per_rev,
        encoder.counts_per_rev(),
        encoder.sampling_period_us(),
        encoder.mode(),
        blending,
        cfg.filter.min_edge_interval_us,
        cfg.velocity.stall_timeout_us / 1_000,
    )
}
