//! Constant-rate simulation, in virtual time or on the wall clock.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use quadrature_config::Config;
use quadrature_core::sampler::Sampler;
use quadrature_core::util::{MICROS_PER_SEC, edge_spacing_us, period_us};
use quadrature_core::{DecodeMode, SamplingCfg};
use quadrature_traits::{Clock, ManualClock, MonotonicClock};

use crate::output::{Reporter, Status};
use crate::rig::{SimSource, banner, build_encoder};

pub struct SimulateArgs {
    pub cps: f32,
    pub seconds: f32,
    pub mode: DecodeMode,
    pub csv: Option<PathBuf>,
    pub every: u32,
    pub sample_hz: Option<u32>,
    pub realtime: bool,
    pub json: bool,
}

fn reporter(args: &SimulateArgs) -> eyre::Result<Reporter> {
    let r = Reporter::new(args.json, args.every);
    match &args.csv {
        Some(p) => r.with_csv(p),
        None => Ok(r),
    }
}

fn sampling_override(args: &SimulateArgs) -> Option<SamplingCfg> {
    args.sample_hz.map(|hz| SamplingCfg {
        period_us: period_us(hz),
    })
}

/// Counts the steps taken and flags each completed revolution.
struct Travel {
    counts: u64,
    counts_per_rev: u64,
    carry: u32,
}

impl Travel {
    fn new(counts_per_rev: u32) -> Self {
        Self {
            counts: 0,
            counts_per_rev: u64::from(counts_per_rev.max(1)),
            carry: 0,
        }
    }

    fn step(&mut self, source: &SimSource, dir: i8, at_us: Option<u64>) {
        match at_us {
            Some(t) => source.step_at(dir, t, &mut self.carry),
            None => source.step(dir, &mut self.carry),
        }
        self.counts += 1;
        if self.counts % self.counts_per_rev == 0 {
            source.pulse_index();
        }
    }
}

pub fn run(cfg: &Config, args: &SimulateArgs) -> eyre::Result<()> {
    if !args.seconds.is_finite() || args.seconds < 0.0 {
        eyre::bail!("--seconds must be a non-negative number");
    }
    if !args.cps.is_finite() {
        eyre::bail!("--cps must be finite");
    }
    if args.realtime {
        run_realtime(cfg, args)
    } else {
        run_virtual(cfg, args)
    }
}

/// Deterministic run: edges and ticks are merged in timestamp order on a
/// manual clock.
fn run_virtual(cfg: &Config, args: &SimulateArgs) -> eyre::Result<()> {
    let clock = ManualClock::new();
    let (mut encoder, source) = build_encoder(
        cfg,
        args.mode,
        Box::new(clock.clone()),
        sampling_override(args),
    )?;
    if !args.json {
        println!("{}", banner(cfg, &encoder));
    }
    let mut out = reporter(args)?;
    let mut travel = Travel::new(encoder.counts_per_rev());

    let dir: i8 = if args.cps < 0.0 { -1 } else { 1 };
    let spacing = edge_spacing_us(args.cps);
    let end_us = (f64::from(args.seconds) * MICROS_PER_SEC as f64) as u64;
    let period = encoder.sampling_period_us();

    let mut next_edge = spacing;
    let mut next_tick = period;
    loop {
        let edge_due = next_edge.filter(|t| (*t as u64) < next_tick);
        if let (Some(t), Some(s)) = (edge_due, spacing) {
            let at = t as u64;
            if at > end_us {
                break;
            }
            clock.set(at);
            travel.step(&source, dir, None);
            next_edge = Some(t + s);
        } else {
            if next_tick > end_us {
                break;
            }
            clock.set(next_tick);
            if let Some(est) = encoder.sample_tick(next_tick) {
                let status = Status::new(
                    next_tick,
                    encoder.tick_position(),
                    &est,
                    encoder.index_observed(),
                );
                out.report(&status)?;
            }
            next_tick += period;
        }
    }

    let diag = encoder.diagnostics();
    tracing::info!(
        position = encoder.position(),
        rpm = encoder.rpm(),
        accepted = diag.accepted_edges,
        rejected = diag.glitches_rejected,
        invalid = diag.invalid_transitions,
        overflows = diag.overflow_events,
        "simulation finished"
    );
    out.finish()
}

/// Wall-clock run: a `Sampler` thread ticks the encoder while this thread
/// emits edges in ~1 ms batches stamped with their ideal times.
fn run_realtime(cfg: &Config, args: &SimulateArgs) -> eyre::Result<()> {
    let clock = MonotonicClock::new();
    let (encoder, source) =
        build_encoder(cfg, args.mode, Box::new(clock), sampling_override(args))?;
    if !args.json {
        println!("{}", banner(cfg, &encoder));
    }
    let mut out = reporter(args)?;
    let mut travel = Travel::new(encoder.counts_per_rev());
    let period = encoder.sampling_period_us();

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    let sampler = Sampler::spawn(encoder, clock);
    let dir: i8 = if args.cps < 0.0 { -1 } else { 1 };
    let spacing = edge_spacing_us(args.cps);
    let end_us = (f64::from(args.seconds) * MICROS_PER_SEC as f64) as u64;
    let start = clock.micros();
    let mut emitted: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        let elapsed = clock.us_since(start);
        if elapsed > end_us {
            break;
        }
        if let Some(s) = spacing {
            let due = (elapsed as f64 / s) as u64;
            while emitted < due {
                emitted += 1;
                let at = start + (emitted as f64 * s) as u64;
                travel.step(&source, dir, Some(at));
            }
        }
        if let Some(r) = sampler.latest() {
            out.report(&Status::new(
                r.at_us.saturating_sub(start),
                r.position,
                &r.estimate,
                r.index_seen,
            ))?;
        }
        clock.sleep(Duration::from_micros(1_000.min(period)));
    }

    if stop.load(Ordering::Relaxed) {
        tracing::info!("interrupted");
    }
    let encoder = sampler
        .shutdown()
        .ok_or_else(|| eyre::eyre!("sampler thread did not return the encoder"))
        .wrap_err("realtime simulation failed")?;
    tracing::info!(
        position = encoder.position(),
        rpm = encoder.rpm(),
        emitted,
        "simulation finished"
    );
    out.finish()
}
