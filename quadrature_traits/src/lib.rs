pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::sync::Arc;

/// Two-bit snapshot of the phase lines, encoded as `(A << 1) | B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhaseState(u8);

impl PhaseState {
    #[inline]
    pub const fn new(a: bool, b: bool) -> Self {
        Self(((a as u8) << 1) | b as u8)
    }

    /// Build from the low two bits of `bits`; higher bits are ignored.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn a(self) -> bool {
        self.0 & 0b10 != 0
    }

    #[inline]
    pub const fn b(self) -> bool {
        self.0 & 0b01 != 0
    }
}

/// Both phase lines sampled by a single register read.
///
/// Implementations must return A and B captured at the same instant; two
/// separate pin reads can straddle an edge and produce a state that never
/// existed on the wire.
pub trait PhaseInput: Send + Sync {
    fn read(&self) -> PhaseState;
}

/// Limit notification raised by a bounded pulse counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitEvent {
    /// Counter reached `+limit` and restarted at zero.
    High,
    /// Counter reached `-limit` and restarted at zero.
    Low,
}

/// Callback registered with a pulse counter; runs in its notification context.
pub type LimitHandler = Arc<dyn Fn(LimitEvent) + Send + Sync>;

/// Channel setup for an edge-counting peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSetup {
    /// Pin whose edges are counted.
    pub pulse_pin: u8,
    /// Pin whose level selects count direction.
    pub ctrl_pin: u8,
    /// Symmetric limit; the counter runs in `(-limit, +limit)`.
    pub limit: i32,
    /// Minimum accepted pulse width in nanoseconds.
    pub filter_ns: u32,
}

pub trait PulseCounter: Send + Sync {
    fn configure(
        &self,
        setup: &CounterSetup,
        on_limit: LimitHandler,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn value(&self) -> i32;
    fn clear(&self);
}
