use std::sync::Arc;

use quadrature_core::error::BuildError;
use quadrature_core::mocks::FixedPhases;
use quadrature_core::{CounterCfg, Encoder, EncoderBuilder, Missing, SamplingCfg, VelocityCfg};
use quadrature_hardware::SimulatedPulseCounter;
use rstest::rstest;

fn build_err(b: EncoderBuilder<quadrature_core::Set>) -> BuildError {
    let err = b.build().expect_err("build should fail");
    err.downcast_ref::<BuildError>()
        .cloned()
        .expect("typed BuildError")
}

#[test]
fn try_build_without_source_is_typed() {
    let b: EncoderBuilder<Missing> = Encoder::builder();
    let err = b.try_build().expect_err("no source");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSource)
    ));
}

#[rstest]
#[case(VelocityCfg { ema_alpha: 0.0, ..VelocityCfg::default() }, "ema_alpha")]
#[case(VelocityCfg { ema_alpha: 1.01, ..VelocityCfg::default() }, "ema_alpha")]
#[case(VelocityCfg { low_speed_cps: -1.0, ..VelocityCfg::default() }, "low_speed_cps")]
#[case(VelocityCfg { high_speed_cps: 1.0, ..VelocityCfg::default() }, "high_speed_cps")]
#[case(VelocityCfg { high_speed_cps: f32::NAN, ..VelocityCfg::default() }, "high_speed_cps")]
#[case(VelocityCfg { counts_per_rev: 0, ..VelocityCfg::default() }, "counts_per_rev")]
fn rejects_bad_velocity_cfg(#[case] v: VelocityCfg, #[case] field: &str) {
    let b = Encoder::builder()
        .with_phase_input(Arc::new(FixedPhases::default()))
        .with_velocity(v);
    match build_err(b) {
        BuildError::InvalidConfig(msg) => assert!(msg.contains(field), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_zero_period() {
    let b = Encoder::builder()
        .with_phase_input(Arc::new(FixedPhases::default()))
        .with_sampling(SamplingCfg { period_us: 0 });
    assert!(matches!(build_err(b), BuildError::InvalidConfig(m) if m.contains("period_us")));
}

#[rstest]
#[case(CounterCfg { limit: 0, ..CounterCfg::default() }, "limit")]
#[case(CounterCfg { counts_per_pulse: 0, ..CounterCfg::default() }, "counts_per_pulse")]
#[case(CounterCfg { counts_per_pulse: 5, ..CounterCfg::default() }, "counts_per_pulse")]
#[case(CounterCfg { pulse_pin: 3, ctrl_pin: 3, ..CounterCfg::default() }, "pins")]
fn rejects_bad_counter_cfg(#[case] c: CounterCfg, #[case] field: &str) {
    let b = Encoder::builder()
        .with_pulse_counter(Arc::new(SimulatedPulseCounter::new()))
        .with_counter(c);
    match build_err(b) {
        BuildError::InvalidConfig(msg) => assert!(msg.contains(field), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn counter_cfg_is_ignored_on_software_path() {
    let enc = Encoder::builder()
        .with_phase_input(Arc::new(FixedPhases::default()))
        .with_counter(CounterCfg {
            limit: 0,
            ..CounterCfg::default()
        })
        .build();
    assert!(enc.is_ok());
}
