use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic microsecond clock shared by the decoder, the sampler and the CLI.
///
/// - micros(): microseconds since the clock's own epoch, never decreasing
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - us_since(): helper to compute elapsed microseconds from an earlier reading
pub trait Clock {
    fn micros(&self) -> u64;
    fn sleep(&self, d: Duration);

    /// Microseconds elapsed since `epoch_us`, saturating at 0 on underflow.
    fn us_since(&self, epoch_us: u64) -> u64 {
        self.micros().saturating_sub(epoch_us)
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn micros(&self) -> u64 {
        let us = self.epoch.elapsed().as_micros();
        u64::try_from(us).unwrap_or(u64::MAX)
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose time only moves when told to.
///
/// Clones share the same time source, so a handle given to an encoder can be
/// advanced from the test or simulation that owns the other handle.
/// `sleep(d)` advances the shared time by `d` without blocking.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an absolute time, in microseconds.
    pub fn starting_at(us: u64) -> Self {
        let c = Self::new();
        c.set(us);
        c
    }

    /// Advance the clock by `us` microseconds.
    pub fn advance(&self, us: u64) {
        let _ = self
            .now_us
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.saturating_add(us))
            });
    }

    /// Set the absolute time. Moving backwards is ignored.
    pub fn set(&self, us: u64) {
        self.now_us.fetch_max(us, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn micros(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }

    fn sleep(&self, d: Duration) {
        self.advance(u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    }
}
