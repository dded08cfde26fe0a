//! Test and helper mocks for quadrature_core

use quadrature_traits::{CounterSetup, LimitHandler, PhaseInput, PhaseState, PulseCounter};

/// Phase lines stuck at one state; no transitions are ever observed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedPhases(pub PhaseState);

impl PhaseInput for FixedPhases {
    fn read(&self) -> PhaseState {
        self.0
    }
}

/// A pulse counter from a foreign backend whose setup always fails with an
/// I/O error; exercises the untyped error mapping.
#[derive(Debug, Default)]
pub struct UnavailableCounter;

impl PulseCounter for UnavailableCounter {
    fn configure(
        &self,
        _setup: &CounterSetup,
        _on_limit: LimitHandler,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("pulse counter unit unavailable")))
    }

    fn value(&self) -> i32 {
        0
    }

    fn clear(&self) {}
}
