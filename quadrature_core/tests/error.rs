use std::sync::Arc;

use quadrature_core::error::EncoderError;
use quadrature_core::hw_error::map_hw_error;
use quadrature_core::mocks::UnavailableCounter;
use quadrature_core::Encoder;
use quadrature_hardware::error::HwError;
use rstest::rstest;

#[rstest]
#[case(HwError::Gpio("pin 18 busy".into()), "hardware fault")]
#[case(HwError::NotConfigured, "hardware fault")]
#[case(HwError::InvalidSetup("limit must be > 0".into()), "configuration error")]
#[case(HwError::Io(std::io::Error::other("eio")), "io error")]
fn typed_hardware_errors(#[case] hw: HwError, #[case] prefix: &str) {
    let mapped = map_hw_error(&hw);
    assert!(mapped.to_string().starts_with(prefix), "{mapped}");
}

#[test]
fn foreign_errors_fall_back_to_strings() {
    let e = std::io::Error::other("device unplugged");
    assert!(matches!(map_hw_error(&e), EncoderError::Hardware(m) if m.contains("unplugged")));
    let e = std::io::Error::other("invalid channel");
    assert!(matches!(map_hw_error(&e), EncoderError::Config(_)));
}

#[test]
fn initialize_reports_typed_error() {
    let mut enc = Encoder::builder()
        .with_pulse_counter(Arc::new(UnavailableCounter))
        .build()
        .expect("build");
    let err = enc.initialize().expect_err("counter unavailable");
    assert!(matches!(
        err.downcast_ref::<EncoderError>(),
        Some(EncoderError::Hardware(_))
    ));
}
