//! Velocity estimation engine.
//!
//! Each tick derives a window rate from the position change since the last
//! tick and, on the software path, an edge rate from the last accepted edge
//! interval. The two are blended by speed regime, smoothed with an EMA and
//! forced to zero once no edge has been accepted for the stall timeout.

use crate::config::VelocityCfg;
use crate::state::EdgeTiming;
use crate::util::{counts_per_sec, rate_from_interval};

/// Position and time recorded at the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleWindow {
    pub position: i64,
    pub at_us: u64,
}

/// Result of one tick. All rates are in counts per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityEstimate {
    pub window_cps: f32,
    /// `None` when no usable edge timing exists (hardware path, first edge, stall).
    pub edge_cps: Option<f32>,
    pub blended_cps: f32,
    pub filtered_cps: f32,
    pub rps: f32,
    pub rpm: f32,
    pub stalled: bool,
}

/// Inputs captured for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    pub position: i64,
    pub now_us: u64,
    pub timing: Option<EdgeTiming>,
    /// Whether this decode path produces edge timing at all.
    pub has_edge_timing: bool,
}

/// Blend window and edge rates. Pass 0.0 for an unavailable edge rate.
///
/// Adaptive mode: below `low_speed_cps` the window rate alone, above
/// `high_speed_cps` (edge rate non-zero) `0.7 * edge + 0.3 * window`, otherwise
/// the mean of both, or whichever is non-zero when the other is exactly zero.
pub fn blend(window_cps: f32, edge_cps: f32, cfg: &VelocityCfg) -> f32 {
    let mean_or_nonzero = || {
        if window_cps != 0.0 && edge_cps != 0.0 {
            0.5 * window_cps + 0.5 * edge_cps
        } else if edge_cps != 0.0 {
            edge_cps
        } else {
            window_cps
        }
    };
    if !cfg.adaptive_blending {
        return mean_or_nonzero();
    }
    let speed = window_cps.abs();
    if speed < cfg.low_speed_cps {
        window_cps
    } else if speed > cfg.high_speed_cps && edge_cps != 0.0 {
        0.7 * edge_cps + 0.3 * window_cps
    } else {
        mean_or_nonzero()
    }
}

#[derive(Debug, Clone)]
pub struct VelocityEngine {
    cfg: VelocityCfg,
    window: SampleWindow,
    filtered: f32,
    last: VelocityEstimate,
}

impl VelocityEngine {
    pub fn new(cfg: VelocityCfg) -> Self {
        Self {
            cfg,
            window: SampleWindow::default(),
            filtered: 0.0,
            last: VelocityEstimate::default(),
        }
    }

    pub fn cfg(&self) -> &VelocityCfg {
        &self.cfg
    }

    pub fn window(&self) -> SampleWindow {
        self.window
    }

    pub fn last(&self) -> VelocityEstimate {
        self.last
    }

    /// Forget all history and start the window at (`position`, `now_us`).
    pub fn restart(&mut self, position: i64, now_us: u64) {
        self.window = SampleWindow {
            position,
            at_us: now_us,
        };
        self.filtered = 0.0;
        self.last = VelocityEstimate::default();
    }

    /// Move the window reference to `position` after a reset/set so the next
    /// tick does not see the jump as motion.
    pub fn rebase(&mut self, position: i64) {
        self.window.position = position;
    }

    fn stalled(&self, input: &TickInput) -> bool {
        if !input.has_edge_timing || self.cfg.stall_timeout_us == 0 {
            return false;
        }
        input.timing.is_none_or(|t| {
            input.now_us.saturating_sub(t.last_edge_us) > self.cfg.stall_timeout_us
        })
    }

    pub fn update(&mut self, input: TickInput) -> VelocityEstimate {
        let elapsed = input.now_us.saturating_sub(self.window.at_us);
        let delta = input.position.wrapping_sub(self.window.position);
        let window_cps = counts_per_sec(delta, elapsed);
        self.window = SampleWindow {
            position: input.position,
            at_us: input.now_us,
        };

        let stalled = self.stalled(&input);
        let edge_cps = if stalled {
            None
        } else {
            input
                .timing
                .and_then(|t| rate_from_interval(t.sign, t.interval_us))
        };

        let blended_cps = if stalled {
            // drop EMA memory too, so the output is exactly zero this tick
            self.filtered = 0.0;
            0.0
        } else {
            blend(window_cps, edge_cps.unwrap_or(0.0), &self.cfg)
        };

        let a = self.cfg.ema_alpha.clamp(f32::MIN_POSITIVE, 1.0);
        self.filtered = a * blended_cps + (1.0 - a) * self.filtered;

        let cpr = self.cfg.counts_per_rev.max(1) as f32;
        let rps = self.filtered / cpr;
        self.last = VelocityEstimate {
            window_cps,
            edge_cps,
            blended_cps,
            filtered_cps: self.filtered,
            rps,
            rpm: rps * 60.0,
            stalled,
        };
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_elapsed_gives_zero_window_rate() {
        let mut e = VelocityEngine::new(VelocityCfg::default());
        e.restart(0, 1_000);
        let est = e.update(TickInput {
            position: 50,
            now_us: 1_000,
            timing: None,
            has_edge_timing: false,
        });
        assert_eq!(est.window_cps, 0.0);
        assert_eq!(est.filtered_cps, 0.0);
    }

    #[test]
    fn hardware_path_never_stalls() {
        let mut e = VelocityEngine::new(VelocityCfg::default());
        e.restart(0, 0);
        let est = e.update(TickInput {
            position: 0,
            now_us: 10_000_000,
            timing: None,
            has_edge_timing: false,
        });
        assert!(!est.stalled);
    }

    #[test]
    fn non_adaptive_averages() {
        let cfg = VelocityCfg {
            adaptive_blending: false,
            ..VelocityCfg::default()
        };
        assert_eq!(blend(5.0, 15.0, &cfg), 10.0);
        assert_eq!(blend(5.0, 0.0, &cfg), 5.0);
        assert_eq!(blend(0.0, 7.0, &cfg), 7.0);
    }
}
