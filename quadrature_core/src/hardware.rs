//! Hardware counter path.
//!
//! The peripheral counts edges in `(-limit, +limit)` and raises a limit event
//! each time it wraps. The limit handler keeps a signed overflow multiplier in
//! the shared state, and position is composed as
//! `base + (overflow * limit + counter) * counts_per_pulse`.
//! The peripheral cannot be preloaded, so `set_position` clears it and moves
//! `base` instead.

use std::sync::Arc;

use quadrature_traits::{CounterSetup, LimitEvent, LimitHandler, PulseCounter};

use crate::config::CounterCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::state::{SharedState, Snapshot};

pub struct HardwareCounterPath {
    counter: Arc<dyn PulseCounter>,
    cfg: CounterCfg,
}

impl core::fmt::Debug for HardwareCounterPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HardwareCounterPath")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Limit handler body; runs in the counter's notification context.
pub(crate) fn on_limit(state: &SharedState, event: LimitEvent) {
    state.lock(|c| {
        if !c.armed {
            return;
        }
        match event {
            LimitEvent::High => c.overflow = c.overflow.wrapping_add(1),
            LimitEvent::Low => c.overflow = c.overflow.wrapping_sub(1),
        }
        c.diag.overflow_events = c.diag.overflow_events.wrapping_add(1);
    });
}

impl HardwareCounterPath {
    pub fn new(counter: Arc<dyn PulseCounter>, cfg: CounterCfg) -> Self {
        Self { counter, cfg }
    }

    pub fn cfg(&self) -> &CounterCfg {
        &self.cfg
    }

    /// Configure the peripheral, register the limit handler and start from zero.
    pub(crate) fn attach(&self, state: &Arc<SharedState>) -> Result<()> {
        let setup = CounterSetup {
            pulse_pin: self.cfg.pulse_pin,
            ctrl_pin: self.cfg.ctrl_pin,
            limit: self.cfg.limit,
            filter_ns: self.cfg.filter_ns,
        };
        let weak = Arc::downgrade(state);
        let handler: LimitHandler = Arc::new(move |ev| {
            if let Some(s) = weak.upgrade() {
                on_limit(&s, ev);
            }
        });
        self.counter
            .configure(&setup, handler)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        state.lock(|c| {
            self.counter.clear();
            c.overflow = 0;
            c.base = 0;
        });
        Ok(())
    }

    #[inline]
    fn compose(&self, base: i64, overflow: i64, raw: i32) -> i64 {
        let range = i64::from(self.cfg.limit);
        let cpp = i64::from(self.cfg.counts_per_pulse);
        base.wrapping_add(
            overflow
                .wrapping_mul(range)
                .wrapping_add(i64::from(raw))
                .wrapping_mul(cpp),
        )
    }

    pub(crate) fn snapshot(&self, state: &SharedState) -> Snapshot {
        state.lock(|c| {
            if !c.armed {
                return Snapshot::default();
            }
            Snapshot {
                position: self.compose(c.base, c.overflow, self.counter.value()),
                timing: None,
                diagnostics: c.diag,
            }
        })
    }

    /// Clear the peripheral and the overflow multiplier and rebase on `value`,
    /// all in one critical section.
    pub(crate) fn set_position(&self, state: &SharedState, value: i64) {
        state.lock(|c| {
            self.counter.clear();
            c.overflow = 0;
            c.base = value;
        });
    }
}
