pub mod error;

use core::cell::RefCell;
use std::sync::atomic::{AtomicU8, Ordering};

use critical_section::Mutex;
use quadrature_traits::{
    CounterSetup, LimitEvent, LimitHandler, PhaseInput, PhaseState, PulseCounter,
};

use crate::error::HwError;

/// Forward Gray sequence of the phase lines: 00 -> 01 -> 11 -> 10.
pub const FORWARD_SEQUENCE: [PhaseState; 4] = [
    PhaseState::from_bits(0b00),
    PhaseState::from_bits(0b01),
    PhaseState::from_bits(0b11),
    PhaseState::from_bits(0b10),
];

fn sequence_index(s: PhaseState) -> usize {
    match s.bits() {
        0b00 => 0,
        0b01 => 1,
        0b11 => 2,
        _ => 3,
    }
}

/// Simulated phase lines held in one byte, so every read is a single load.
#[derive(Debug, Default)]
pub struct SimulatedPhases {
    bits: AtomicU8,
}

impl SimulatedPhases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move one quadrature step; positive `dir` is forward, negative is reverse,
    /// zero leaves the lines untouched. Returns the new state.
    pub fn advance(&self, dir: i8) -> PhaseState {
        let cur = PhaseState::from_bits(self.bits.load(Ordering::Acquire));
        let idx = sequence_index(cur);
        let next = match dir.signum() {
            1 => FORWARD_SEQUENCE[(idx + 1) % 4],
            -1 => FORWARD_SEQUENCE[(idx + 3) % 4],
            _ => cur,
        };
        self.bits.store(next.bits(), Ordering::Release);
        next
    }

    /// Force both lines, e.g. to inject a bounce or a skipped state.
    pub fn set(&self, state: PhaseState) {
        self.bits.store(state.bits(), Ordering::Release);
    }
}

impl PhaseInput for SimulatedPhases {
    fn read(&self) -> PhaseState {
        PhaseState::from_bits(self.bits.load(Ordering::Acquire))
    }
}

struct CounterState {
    value: i32,
    limit: i32,
    on_limit: Option<LimitHandler>,
}

/// Simulated bounded edge counter.
///
/// Counts in `(-limit, +limit)`. Reaching either limit restarts the count at
/// zero and invokes the registered handler, the same way a hardware pulse
/// counter raises its limit interrupt. Each pulse runs inside a critical
/// section, like an interrupt that cannot be preempted by the main loop.
pub struct SimulatedPulseCounter {
    state: Mutex<RefCell<CounterState>>,
    fail_with: Option<String>,
}

impl Default for SimulatedPulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPulseCounter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(CounterState {
                value: 0,
                limit: i32::MAX,
                on_limit: None,
            })),
            fail_with: None,
        }
    }

    /// A counter whose `configure` always fails with a GPIO error.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            fail_with: Some(msg.into()),
            ..Self::new()
        }
    }

    /// Count one pulse in the direction of `dir` (sign only).
    pub fn pulse(&self, dir: i8) {
        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            st.value += i32::from(dir.signum());
            let event = if st.value >= st.limit {
                Some(LimitEvent::High)
            } else if st.value <= -st.limit {
                Some(LimitEvent::Low)
            } else {
                None
            };
            if let Some(ev) = event {
                st.value = 0;
                let handler = st.on_limit.clone();
                drop(st);
                if let Some(h) = handler {
                    h(ev);
                }
            }
        });
    }

    /// Overwrite the raw count without raising limit events.
    pub fn force_value(&self, v: i32) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).value = v);
    }

    pub fn limit(&self) -> i32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).limit)
    }
}

impl PulseCounter for SimulatedPulseCounter {
    fn configure(
        &self,
        setup: &CounterSetup,
        on_limit: LimitHandler,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(msg) = &self.fail_with {
            return Err(Box::new(HwError::Gpio(msg.clone())));
        }
        if setup.limit <= 0 {
            return Err(Box::new(HwError::InvalidSetup(format!(
                "limit must be > 0, got {}",
                setup.limit
            ))));
        }
        if setup.pulse_pin == setup.ctrl_pin {
            return Err(Box::new(HwError::InvalidSetup(
                "pulse and control pins must differ".to_string(),
            )));
        }
        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            st.value = 0;
            st.limit = setup.limit;
            st.on_limit = Some(on_limit);
        });
        tracing::debug!(
            pulse_pin = setup.pulse_pin,
            ctrl_pin = setup.ctrl_pin,
            limit = setup.limit,
            filter_ns = setup.filter_ns,
            "simulated pulse counter configured"
        );
        Ok(())
    }

    fn value(&self) -> i32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).value)
    }

    fn clear(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).value = 0);
    }
}
