//! Common time/rate helpers for quadrature_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Compute the period in microseconds for a given rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Counts per second for `delta` counts over `elapsed_us`; 0 when no time passed.
#[inline]
pub fn counts_per_sec(delta: i64, elapsed_us: u64) -> f32 {
    if elapsed_us == 0 {
        return 0.0;
    }
    (delta as f64 * MICROS_PER_SEC as f64 / elapsed_us as f64) as f32
}

/// Signed rate implied by one edge interval; `None` when the interval is 0.
#[inline]
pub fn rate_from_interval(sign: i8, interval_us: u64) -> Option<f32> {
    if interval_us == 0 {
        return None;
    }
    Some((f64::from(sign.signum()) * MICROS_PER_SEC as f64 / interval_us as f64) as f32)
}

/// Average spacing between edges at `cps` counts per second, in microseconds.
/// `None` for a zero or non-finite rate.
#[inline]
pub fn edge_spacing_us(cps: f32) -> Option<f64> {
    let r = f64::from(cps).abs();
    if !r.is_finite() || r == 0.0 {
        return None;
    }
    Some(MICROS_PER_SEC as f64 / r)
}
