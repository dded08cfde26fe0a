use std::sync::Arc;

use quadrature_core::{CounterCfg, DecodeMode, Encoder};
use quadrature_hardware::SimulatedPulseCounter;
use quadrature_traits::{Clock, ManualClock, PulseCounter};
use rstest::rstest;

fn rig(limit: i32, counts_per_pulse: u32) -> (Encoder, Arc<SimulatedPulseCounter>, ManualClock) {
    let counter = Arc::new(SimulatedPulseCounter::new());
    let clock = ManualClock::new();
    let mut enc = Encoder::builder()
        .with_pulse_counter(counter.clone())
        .with_counter(CounterCfg {
            limit,
            counts_per_pulse,
            ..CounterCfg::default()
        })
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build");
    enc.initialize().expect("init");
    (enc, counter, clock)
}

fn pulses(counter: &SimulatedPulseCounter, n: i64) {
    let dir = if n >= 0 { 1 } else { -1 };
    for _ in 0..n.abs() {
        counter.pulse(dir);
    }
}

#[test]
fn overflow_up_twice_down_once() {
    let limit = 100;
    let (enc, counter, _) = rig(limit, 1);
    // +limit twice
    pulses(&counter, 2 * i64::from(limit));
    // -limit once from zero
    pulses(&counter, -i64::from(limit));
    // then settle at a final raw value
    pulses(&counter, 37);
    assert_eq!(counter.value(), 37);
    assert_eq!(enc.position(), (2 - 1) * i64::from(limit) + 37);
    assert_eq!(enc.diagnostics().overflow_events, 3);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn scaled_by_counts_per_pulse(#[case] cpp: u32) {
    let (enc, counter, _) = rig(50, cpp);
    pulses(&counter, 130);
    assert_eq!(enc.position(), 130 * i64::from(cpp));
    pulses(&counter, -260);
    assert_eq!(enc.position(), -130 * i64::from(cpp));
}

#[test]
fn default_range_matches_peripheral_limit() {
    let (enc, counter, _) = rig(32767, 4);
    pulses(&counter, 40_000);
    assert_eq!(enc.position(), 40_000 * 4);
    assert_eq!(enc.mode(), DecodeMode::Hardware);
}

#[test]
fn set_position_clears_counter_and_overflow() {
    let (mut enc, counter, _) = rig(10, 4);
    pulses(&counter, 27);
    assert_eq!(enc.position(), 108);

    enc.set_position(-5_000);
    assert_eq!(counter.value(), 0);
    assert_eq!(enc.position(), -5_000);
    pulses(&counter, 3);
    assert_eq!(enc.position(), -5_000 + 12);

    enc.reset_position();
    assert_eq!(enc.position(), 0);
    pulses(&counter, -25);
    assert_eq!(enc.position(), -100);
}

#[test]
fn no_edge_timing_so_window_rate_only() {
    let (mut enc, counter, clock) = rig(32767, 4);
    // 25 pulses (100 counts) per 10 ms tick = 10_000 cps
    for _ in 0..40 {
        pulses(&counter, 25);
        clock.advance(10_000);
        let est = enc.sample_tick(clock.micros()).expect("tick due");
        assert_eq!(est.edge_cps, None);
        assert!(!est.stalled);
        assert!((est.window_cps - 10_000.0).abs() < 1e-2);
    }
    assert!((enc.filtered_rate() - 10_000.0).abs() < 1.0);
    assert_eq!(enc.direction(), 1);
}

#[test]
fn configure_failure_surfaces_from_initialize() {
    let counter = Arc::new(SimulatedPulseCounter::failing("unit busy"));
    let mut enc = Encoder::builder()
        .with_pulse_counter(counter)
        .build()
        .expect("build");
    let err = enc.initialize().expect_err("configure must fail");
    assert!(format!("{err}").contains("unit busy"));
    assert!(!enc.is_initialized());
    assert_eq!(enc.position(), 0);
}

#[test]
fn failed_initialize_leaves_index_unarmed() {
    let counter = Arc::new(SimulatedPulseCounter::failing("unit busy"));
    let mut enc = Encoder::builder()
        .with_pulse_counter(counter)
        .build()
        .expect("build");
    assert!(enc.initialize().is_err());
    enc.edge_handle().on_index();
    assert!(!enc.index_observed());
    assert!(!enc.is_initialized());
    assert_eq!(enc.position(), 0);
}

#[test]
fn limit_events_before_initialize_are_ignored() {
    let counter = Arc::new(SimulatedPulseCounter::new());
    let enc = Encoder::builder()
        .with_pulse_counter(counter.clone())
        .build()
        .expect("build");
    pulses(&counter, 5);
    assert_eq!(enc.position(), 0);
    assert_eq!(enc.diagnostics().overflow_events, 0);
}
