//! Maps `Box<dyn Error>` from trait boundaries to typed `EncoderError`.
//!
//! The traits in `quadrature_traits` use `Box<dyn Error + Send + Sync>` so any
//! platform backend can plug in; this module converts those to our typed error
//! enum, with an optional feature-gated path for `quadrature_hardware::HwError`.

use crate::error::EncoderError;

/// Map a trait-boundary error to a typed `EncoderError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> EncoderError {
    #[cfg(feature = "hardware-errors")]
    {
        use quadrature_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::InvalidSetup(msg) => EncoderError::Config(msg.clone()),
                HwError::Io(io) => EncoderError::Io(io.to_string()),
                other => EncoderError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("invalid") || lower.contains("limit") {
        EncoderError::Config(s)
    } else {
        EncoderError::Hardware(s)
    }
}
