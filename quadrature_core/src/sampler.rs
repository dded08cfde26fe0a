//! Background velocity sampling.
//!
//! Spawns a thread that owns the `Encoder`, runs `sample_tick` at the
//! configured period, applies reset/set commands between ticks and publishes
//! the latest `Reading` through a bounded channel.
//!
//! Safety: Each `Sampler` spawns exactly one thread that is automatically
//! shut down when the `Sampler` is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use quadrature_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::encoder::Encoder;
use crate::software::EdgeHandle;
use crate::velocity::VelocityEstimate;

/// Position reprogramming requests applied by the sampler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Set(i64),
}

/// One published tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub at_us: u64,
    pub position: i64,
    pub estimate: VelocityEstimate,
    pub index_seen: bool,
}

fn apply_commands(encoder: &mut Encoder, cmd_rx: &xch::Receiver<Command>) {
    for cmd in cmd_rx.try_iter() {
        match cmd {
            Command::Reset => encoder.reset_position(),
            Command::Set(v) => encoder.set_position(v),
        }
    }
}

pub struct Sampler {
    rx: xch::Receiver<Reading>,
    cmd_tx: xch::Sender<Command>,
    edges: EdgeHandle,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle; the thread hands the encoder back when it exits
    join_handle: Option<JoinHandle<Encoder>>,
}

impl Sampler {
    /// Move `encoder` (already initialized) into a sampling thread driven by `clock`.
    pub fn spawn<C: Clock + Send + Sync + 'static>(mut encoder: Encoder, clock: C) -> Self {
        let (tx, rx) = xch::bounded(1);
        let stale_rx = rx.clone();
        let (cmd_tx, cmd_rx) = xch::unbounded::<Command>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let edges = encoder.edge_handle();
        let period_us = encoder.sampling_period_us();

        let join_handle = std::thread::spawn(move || {
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Sampler thread received shutdown signal");
                    break;
                }

                apply_commands(&mut encoder, &cmd_rx);

                let now = clock.micros();
                if let Some(estimate) = encoder.sample_tick(now) {
                    let reading = Reading {
                        at_us: now,
                        position: encoder.tick_position(),
                        estimate,
                        index_seen: encoder.index_observed(),
                    };
                    // Keep only the newest reading in the slot
                    let _ = stale_rx.try_recv();
                    let _ = tx.try_send(reading);
                }

                let remaining = period_us.saturating_sub(clock.us_since(now)).max(1);
                clock.sleep(Duration::from_micros(remaining));
            }
            // Commands sent right before shutdown still take effect
            apply_commands(&mut encoder, &cmd_rx);
            tracing::trace!("Sampler thread exiting cleanly");
            encoder
        });

        Self {
            rx,
            cmd_tx,
            edges,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Newest reading since the last call, if any.
    pub fn latest(&self) -> Option<Reading> {
        self.rx.try_iter().last()
    }

    /// Block up to `timeout` for the next reading.
    pub fn next_reading(&self, timeout: Duration) -> Option<Reading> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Notification handle for the encoder owned by the thread.
    pub fn edge_handle(&self) -> EdgeHandle {
        self.edges.clone()
    }

    pub fn reset_position(&self) {
        self.send(Command::Reset);
    }

    pub fn set_position(&self, value: i64) {
        self.send(Command::Set(value));
    }

    fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!(?cmd, "sampler thread gone; command dropped");
        }
    }

    /// Stop the thread and take the encoder back.
    pub fn shutdown(mut self) -> Option<Encoder> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Encoder> {
        self.shutdown.store(true, Ordering::Relaxed);
        let handle = self.join_handle.take()?;
        match handle.join() {
            Ok(enc) => {
                tracing::trace!("Sampler thread joined successfully");
                Some(enc)
            }
            Err(e) => {
                // Thread panicked; log but don't propagate
                tracing::warn!(?e, "Sampler thread panicked during shutdown");
                None
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
