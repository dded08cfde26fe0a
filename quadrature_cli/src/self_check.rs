//! Quick health check of the decode table and both decode paths.

use quadrature_config::Config;
use quadrature_core::DecodeMode;
use quadrature_core::decode::decode;
use quadrature_hardware::FORWARD_SEQUENCE;
use quadrature_traits::ManualClock;

use crate::rig::build_encoder;

fn check_table() -> eyre::Result<()> {
    for i in 0..FORWARD_SEQUENCE.len() {
        let prev = FORWARD_SEQUENCE[i];
        let next = FORWARD_SEQUENCE[(i + 1) % FORWARD_SEQUENCE.len()];
        if decode(prev, next) != 1 || decode(next, prev) != -1 {
            eyre::bail!(
                "decode table mismatch at {:02b} -> {:02b}",
                prev.bits(),
                next.bits()
            );
        }
    }
    Ok(())
}

fn check_path(cfg: &Config, mode: DecodeMode) -> eyre::Result<()> {
    let clock = ManualClock::new();
    let (encoder, source) = build_encoder(cfg, mode, Box::new(clock.clone()), None)?;
    let steps = 4 * i64::from(cfg.counter.counts_per_pulse);
    let mut carry = 0;
    for dir in [1i8, -1] {
        for _ in 0..steps {
            clock.advance(1_000);
            source.step(dir, &mut carry);
        }
        let want = if dir > 0 { steps } else { 0 };
        if encoder.position() != want {
            eyre::bail!(
                "{mode} path counted {} where {want} was expected",
                encoder.position()
            );
        }
    }
    tracing::debug!(%mode, "decode path ok");
    Ok(())
}

pub fn run(cfg: &Config) -> eyre::Result<()> {
    check_table()?;
    check_path(cfg, DecodeMode::Software)?;
    check_path(cfg, DecodeMode::Hardware)?;
    println!("self-check ok");
    Ok(())
}
