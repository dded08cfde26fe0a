//! Interrupt-driven software decoder.
//!
//! `EdgeHandle` is what platform glue calls from the phase-change and index
//! notifications. Each call is one phase read, one clock read and one short
//! critical section: no allocation, no logging, no blocking.

use std::sync::Arc;

use quadrature_traits::{Clock, PhaseInput, PhaseState};

use crate::decode::{Transition, classify};
use crate::state::{Counters, EdgeTiming, SharedState};

/// Apply one observed phase state to the shared counters.
///
/// The remembered phase is updated even when the edge is rejected, so a
/// filtered glitch never desynchronises later decoding.
pub(crate) fn apply_transition(
    c: &mut Counters,
    phase: PhaseState,
    now_us: u64,
    min_edge_interval_us: u64,
) {
    if !c.armed {
        return;
    }
    let prev = c.prev_phase;
    c.prev_phase = phase;
    match classify(prev, phase) {
        Transition::Idle => {}
        Transition::DoubleStep => {
            c.diag.invalid_transitions = c.diag.invalid_transitions.wrapping_add(1);
        }
        Transition::Step(delta) => {
            let last = c.timing.map(|t| t.last_edge_us);
            if let Some(last) = last
                && now_us.saturating_sub(last) < min_edge_interval_us
            {
                c.diag.glitches_rejected = c.diag.glitches_rejected.wrapping_add(1);
                return;
            }
            c.position = c.position.wrapping_add(i64::from(delta));
            c.timing = Some(EdgeTiming {
                last_edge_us: now_us,
                interval_us: last.map_or(0, |l| now_us.saturating_sub(l)),
                sign: delta,
            });
            c.direction = delta;
            c.diag.accepted_edges = c.diag.accepted_edges.wrapping_add(1);
        }
    }
}

/// Cloneable notification entry point handed to interrupt glue.
#[derive(Clone)]
pub struct EdgeHandle {
    pub(crate) state: Arc<SharedState>,
    pub(crate) input: Option<Arc<dyn PhaseInput>>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) min_edge_interval_us: u64,
    pub(crate) use_index: bool,
}

impl core::fmt::Debug for EdgeHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EdgeHandle")
            .field("software", &self.input.is_some())
            .field("min_edge_interval_us", &self.min_edge_interval_us)
            .field("use_index", &self.use_index)
            .finish_non_exhaustive()
    }
}

impl EdgeHandle {
    /// Phase-change notification: sample both lines and the clock, then decode.
    /// No-op on the hardware path.
    #[inline]
    pub fn on_phase_change(&self) {
        if let Some(input) = &self.input {
            let phase = input.read();
            let now = self.clock.micros();
            self.record_transition(phase, now);
        }
    }

    /// Decode a phase state captured by the caller at `now_us`.
    /// No-op on the hardware path.
    #[inline]
    pub fn record_transition(&self, phase: PhaseState, now_us: u64) {
        if self.input.is_none() {
            return;
        }
        let min = self.min_edge_interval_us;
        self.state.lock(|c| apply_transition(c, phase, now_us, min));
    }

    /// Index-channel notification (rising edge).
    #[inline]
    pub fn on_index(&self) {
        if self.use_index {
            self.state.mark_index();
        }
    }
}
