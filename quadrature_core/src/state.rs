//! State shared between the notification context and the sampling loop.
//!
//! Everything lives in one `critical_section::Mutex`, so every multi-word read
//! or write is a single short critical section. On a host the `std`
//! implementation of `critical-section` provides a process-wide lock; on a
//! microcontroller it masks interrupts.

use core::cell::RefCell;

use critical_section::Mutex;
use quadrature_traits::PhaseState;

/// Timing of the most recent accepted edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeTiming {
    pub last_edge_us: u64,
    /// Interval between the last two accepted edges; 0 after the first edge.
    pub interval_us: u64,
    /// Sign of the last accepted delta.
    pub sign: i8,
}

/// Monotonic event counters. Cleared only by `Encoder::initialize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub accepted_edges: u64,
    pub glitches_rejected: u64,
    pub invalid_transitions: u64,
    pub overflow_events: u64,
}

/// Consistent copy of the shared counters taken in one critical section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub position: i64,
    pub timing: Option<EdgeTiming>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) armed: bool,
    pub(crate) position: i64,
    pub(crate) prev_phase: PhaseState,
    pub(crate) timing: Option<EdgeTiming>,
    pub(crate) direction: i8,
    pub(crate) overflow: i64,
    pub(crate) base: i64,
    pub(crate) index_seen: bool,
    pub(crate) diag: Diagnostics,
}

#[derive(Debug)]
pub struct SharedState {
    inner: Mutex<RefCell<Counters>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Counters::default())),
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn lock<R>(&self, f: impl FnOnce(&mut Counters) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Clear everything and start accepting notifications from `phase`.
    pub(crate) fn arm(&self, phase: PhaseState) {
        self.lock(|c| {
            *c = Counters {
                armed: true,
                prev_phase: phase,
                ..Counters::default()
            };
        });
    }

    /// Stop accepting notifications. Counters keep their values until the
    /// next `arm`.
    pub(crate) fn disarm(&self) {
        self.lock(|c| c.armed = false);
    }

    pub fn is_armed(&self) -> bool {
        self.lock(|c| c.armed)
    }

    pub fn direction(&self) -> i8 {
        self.lock(|c| c.direction)
    }

    pub(crate) fn set_direction(&self, sign: i8) {
        self.lock(|c| c.direction = sign.signum());
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.lock(|c| c.diag)
    }

    /// Latch the index mark. Ignored until armed.
    pub(crate) fn mark_index(&self) {
        self.lock(|c| {
            if c.armed {
                c.index_seen = true;
            }
        });
    }

    /// Read and clear the index latch.
    pub(crate) fn take_index(&self) -> bool {
        self.lock(|c| core::mem::take(&mut c.index_seen))
    }
}
