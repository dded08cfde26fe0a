//! `Encoder`: position accounting and the periodic velocity tick over either
//! decode path.

use std::sync::Arc;

use quadrature_traits::{Clock, PhaseInput};

use crate::config::{DecodeMode, DecoderCfg, SamplingCfg};
use crate::error::Result;
use crate::hardware::HardwareCounterPath;
use crate::software::EdgeHandle;
use crate::state::{Diagnostics, SharedState, Snapshot};
use crate::velocity::{TickInput, VelocityEngine, VelocityEstimate};

/// Decode path selected at build time.
pub enum DecodePath {
    /// Table decoding from phase-change notifications.
    Software { input: Arc<dyn PhaseInput> },
    /// Peripheral edge counting with overflow extension.
    Hardware(HardwareCounterPath),
}

impl DecodePath {
    pub fn mode(&self) -> DecodeMode {
        match self {
            Self::Software { .. } => DecodeMode::Software,
            Self::Hardware(_) => DecodeMode::Hardware,
        }
    }

    fn initialize(&self, state: &Arc<SharedState>) -> Result<()> {
        match self {
            Self::Software { input } => state.arm(input.read()),
            Self::Hardware(hw) => {
                hw.attach(state)?;
                state.arm(Default::default());
            }
        }
        Ok(())
    }

    fn snapshot(&self, state: &SharedState) -> Snapshot {
        match self {
            Self::Software { .. } => state.lock(|c| Snapshot {
                position: c.position,
                timing: c.timing,
                diagnostics: c.diag,
            }),
            Self::Hardware(hw) => hw.snapshot(state),
        }
    }

    fn set_position(&self, state: &SharedState, value: i64) {
        match self {
            Self::Software { .. } => state.lock(|c| c.position = value),
            Self::Hardware(hw) => hw.set_position(state, value),
        }
    }
}

pub struct Encoder {
    pub(crate) path: DecodePath,
    pub(crate) state: Arc<SharedState>,
    pub(crate) velocity: VelocityEngine,
    pub(crate) decoder: DecoderCfg,
    pub(crate) sampling: SamplingCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) initialized: bool,
    pub(crate) last_tick_us: u64,
    pub(crate) last_invalid: u64,
}

impl core::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Encoder")
            .field("mode", &self.path.mode())
            .field("initialized", &self.initialized)
            .field("position", &self.position())
            .field("filtered_cps", &self.filtered_rate())
            .finish_non_exhaustive()
    }
}

impl Encoder {
    /// Start building an Encoder.
    pub fn builder() -> crate::builder::EncoderBuilder<crate::builder::Missing> {
        crate::builder::EncoderBuilder::default()
    }

    /// Arm the decode path and zero position, overflow, timing and diagnostics.
    /// Calling it again fully restarts the encoder.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialized = false;
        self.state.disarm();
        self.path.initialize(&self.state)?;
        let now = self.clock.micros();
        self.velocity.restart(0, now);
        self.last_tick_us = now;
        self.last_invalid = 0;
        self.initialized = true;
        tracing::debug!(
            mode = %self.path.mode(),
            period_us = self.sampling.period_us,
            counts_per_rev = self.velocity.cfg().counts_per_rev,
            "encoder initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn mode(&self) -> DecodeMode {
        self.path.mode()
    }

    /// Current position; 0 before `initialize`.
    pub fn position(&self) -> i64 {
        if !self.initialized {
            return 0;
        }
        self.path.snapshot(&self.state).position
    }

    /// Position the latest estimate was computed from.
    pub fn tick_position(&self) -> i64 {
        self.velocity.window().position
    }

    /// EMA-filtered rate in counts per second from the latest tick.
    pub fn filtered_rate(&self) -> f32 {
        self.velocity.last().filtered_cps
    }

    pub fn revolutions_per_second(&self) -> f32 {
        self.velocity.last().rps
    }

    pub fn rpm(&self) -> f32 {
        self.velocity.last().rpm
    }

    /// Latest full estimate; all zeros before the first tick.
    pub fn estimate(&self) -> VelocityEstimate {
        self.velocity.last()
    }

    /// Sign of the last observed motion: -1, 0 (none yet) or +1.
    pub fn direction(&self) -> i8 {
        self.state.direction()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.state.diagnostics()
    }

    /// Read and clear the index latch.
    pub fn index_observed(&self) -> bool {
        self.state.take_index()
    }

    pub fn sampling_period_us(&self) -> u64 {
        self.sampling.period_us
    }

    pub fn counts_per_rev(&self) -> u32 {
        self.velocity.cfg().counts_per_rev
    }

    /// Handle for notification-context glue.
    pub fn edge_handle(&self) -> EdgeHandle {
        let input = match &self.path {
            DecodePath::Software { input } => Some(input.clone()),
            DecodePath::Hardware(_) => None,
        };
        EdgeHandle {
            state: self.state.clone(),
            input,
            clock: self.clock.clone(),
            min_edge_interval_us: self.decoder.min_edge_interval_us,
            use_index: self.decoder.use_index,
        }
    }

    pub fn reset_position(&mut self) {
        self.set_position(0);
    }

    /// Program the position and move the velocity window reference with it.
    /// Ignored before `initialize`.
    pub fn set_position(&mut self, value: i64) {
        if !self.initialized {
            return;
        }
        self.path.set_position(&self.state, value);
        self.velocity.rebase(value);
        tracing::debug!(value, "position set");
    }

    /// Periodic tick. Computes a new estimate when at least one sampling period
    /// has passed since the previous one, otherwise returns `None`.
    pub fn sample_tick(&mut self, now_us: u64) -> Option<VelocityEstimate> {
        if !self.initialized || now_us.saturating_sub(self.last_tick_us) < self.sampling.period_us
        {
            return None;
        }
        self.last_tick_us = now_us;

        let snap = self.path.snapshot(&self.state);
        let invalid = snap.diagnostics.invalid_transitions;
        if invalid > self.last_invalid {
            tracing::debug!(
                new = invalid - self.last_invalid,
                total = invalid,
                "invalid quadrature transitions"
            );
        }
        self.last_invalid = invalid;

        let prev_position = self.velocity.window().position;
        let est = self.velocity.update(TickInput {
            position: snap.position,
            now_us,
            timing: snap.timing,
            has_edge_timing: matches!(self.path, DecodePath::Software { .. }),
        });
        if matches!(self.path, DecodePath::Hardware(_)) && snap.position != prev_position {
            self.state
                .set_direction(if snap.position > prev_position { 1 } else { -1 });
        }
        tracing::trace!(
            position = snap.position,
            window_cps = est.window_cps,
            blended_cps = est.blended_cps,
            filtered_cps = est.filtered_cps,
            stalled = est.stalled,
            "velocity tick"
        );
        Some(est)
    }
}
