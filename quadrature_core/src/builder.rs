//! Type-state builder for `Encoder`.
//!
//! The builder enforces at compile time that a decode source (phase input for
//! the software path, pulse counter for the hardware path) is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use quadrature_traits::clock::{Clock, MonotonicClock};
use quadrature_traits::{PhaseInput, PulseCounter};

use crate::config::{CounterCfg, DecoderCfg, SamplingCfg, VelocityCfg};
use crate::encoder::{DecodePath, Encoder};
use crate::error::{BuildError, Result};
use crate::hardware::HardwareCounterPath;
use crate::state::SharedState;
use crate::velocity::VelocityEngine;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

enum Source {
    Phases(Arc<dyn PhaseInput>),
    Counter(Arc<dyn PulseCounter>),
}

/// Builder for `Encoder`. All fields are validated on `build()`.
pub struct EncoderBuilder<S> {
    source: Option<Source>,
    decoder: Option<DecoderCfg>,
    counter: Option<CounterCfg>,
    sampling: Option<SamplingCfg>,
    velocity: Option<VelocityCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
}

impl Default for EncoderBuilder<Missing> {
    fn default() -> Self {
        Self {
            source: None,
            decoder: None,
            counter: None,
            sampling: None,
            velocity: None,
            clock: None,
            _s: PhantomData,
        }
    }
}

/// Validate configuration and construct an `Encoder`.
///
/// This is the single source of truth for validation and construction.
fn validate_and_build(
    source: Source,
    decoder: DecoderCfg,
    counter: CounterCfg,
    sampling: SamplingCfg,
    velocity: VelocityCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Encoder> {
    // ── Validation ───────────────────────────────────────────────────────────
    if sampling.period_us == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "period_us must be > 0",
        )));
    }
    if !(velocity.ema_alpha > 0.0 && velocity.ema_alpha <= 1.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "ema_alpha must be in (0.0, 1.0]",
        )));
    }
    if !velocity.low_speed_cps.is_finite() || velocity.low_speed_cps < 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "low_speed_cps must be >= 0",
        )));
    }
    if !velocity.high_speed_cps.is_finite() || velocity.high_speed_cps < velocity.low_speed_cps {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "high_speed_cps must be >= low_speed_cps",
        )));
    }
    if velocity.counts_per_rev == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "counts_per_rev must be > 0",
        )));
    }

    let path = match source {
        Source::Phases(input) => DecodePath::Software { input },
        Source::Counter(c) => {
            if counter.limit <= 0 {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "counter limit must be > 0",
                )));
            }
            if !(1..=4).contains(&counter.counts_per_pulse) {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "counts_per_pulse must be in [1, 4]",
                )));
            }
            if counter.pulse_pin == counter.ctrl_pin {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "pulse and control pins must differ",
                )));
            }
            DecodePath::Hardware(HardwareCounterPath::new(c, counter))
        }
    };

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };

    Ok(Encoder {
        path,
        state: Arc::new(SharedState::new()),
        velocity: VelocityEngine::new(velocity),
        decoder,
        sampling,
        clock,
        initialized: false,
        last_tick_us: 0,
        last_invalid: 0,
    })
}

impl<S> EncoderBuilder<S> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Encoder> {
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        validate_and_build(
            source,
            self.decoder.unwrap_or_default(),
            self.counter.unwrap_or_default(),
            self.sampling.unwrap_or_default(),
            self.velocity.unwrap_or_default(),
            self.clock,
        )
    }

    fn with_source<T>(self, source: Source) -> EncoderBuilder<T> {
        EncoderBuilder {
            source: Some(source),
            decoder: self.decoder,
            counter: self.counter,
            sampling: self.sampling,
            velocity: self.velocity,
            clock: self.clock,
            _s: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<S> EncoderBuilder<S> {
    pub fn with_decoder(mut self, decoder: DecoderCfg) -> Self {
        self.decoder = Some(decoder);
        self
    }
    pub fn with_counter(mut self, counter: CounterCfg) -> Self {
        self.counter = Some(counter);
        self
    }
    pub fn with_sampling(mut self, sampling: SamplingCfg) -> Self {
        self.sampling = Some(sampling);
        self
    }
    pub fn with_velocity(mut self, velocity: VelocityCfg) -> Self {
        self.velocity = Some(velocity);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl EncoderBuilder<Missing> {
    /// Software path: decode phase-change notifications through the table.
    pub fn with_phase_input(self, input: Arc<dyn PhaseInput>) -> EncoderBuilder<Set> {
        self.with_source(Source::Phases(input))
    }

    /// Hardware path: count edges with a pulse-counter peripheral.
    pub fn with_pulse_counter(self, counter: Arc<dyn PulseCounter>) -> EncoderBuilder<Set> {
        self.with_source(Source::Counter(counter))
    }
}

impl EncoderBuilder<Set> {
    pub fn build(self) -> Result<Encoder> {
        self.try_build()
    }
}
