//! Line-oriented command console over stdin.

use std::io::BufRead;

use quadrature_config::Config;
use quadrature_core::{DecodeMode, Encoder};
use quadrature_traits::{Clock, ManualClock};

use crate::output::{Reporter, Status};
use crate::rig::{SimSource, banner, build_encoder};

/// Virtual spacing between simulated edges for `MOVE`.
const MOVE_EDGE_SPACING_US: u64 = 100;

pub const UNKNOWN_REPLY: &str = "Unknown command. Available: ZERO, SET <n>, MOVE <n>, STATUS, QUIT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Zero,
    Set(i64),
    Move(i64),
    Status,
    Quit,
}

/// Parse one input line. `Ok(None)` for blank lines, `Err(reply)` for
/// anything that should be answered with a message instead.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let number = |name: &str| -> Result<i64, String> {
        let raw = arg.ok_or_else(|| format!("{name} needs a value"))?;
        raw.parse::<i64>()
            .map_err(|_| format!("Invalid value for {name}: {raw}"))
    };
    let cmd = match head.to_ascii_uppercase().as_str() {
        "ZERO" => Command::Zero,
        "SET" => Command::Set(number("SET")?),
        "MOVE" => Command::Move(number("MOVE")?),
        "STATUS" => Command::Status,
        "QUIT" | "EXIT" => Command::Quit,
        _ => return Err(UNKNOWN_REPLY.to_string()),
    };
    Ok(Some(cmd))
}

struct Session {
    encoder: Encoder,
    source: SimSource,
    clock: ManualClock,
    reporter: Reporter,
    carry: u32,
    travel: u64,
}

impl Session {
    fn tick(&mut self) -> Option<Status> {
        let now = self.clock.micros();
        let est = self.encoder.sample_tick(now)?;
        Some(Status::new(
            now,
            self.encoder.position(),
            &est,
            self.encoder.index_observed(),
        ))
    }

    fn step(&mut self, dir: i8) {
        self.clock.advance(MOVE_EDGE_SPACING_US);
        self.source.step(dir, &mut self.carry);
        self.travel += 1;
        if self.travel % u64::from(self.encoder.counts_per_rev().max(1)) == 0 {
            self.source.pulse_index();
        }
        let _ = self.tick();
    }

    fn apply(&mut self, cmd: Command) -> eyre::Result<Option<String>> {
        let reply = match cmd {
            Command::Zero => {
                self.encoder.reset_position();
                "Encoder position reset to zero".to_string()
            }
            Command::Set(v) => {
                self.encoder.set_position(v);
                format!("Encoder position set to {v}")
            }
            Command::Move(n) => {
                let dir: i8 = if n < 0 { -1 } else { 1 };
                for _ in 0..n.unsigned_abs() {
                    self.step(dir);
                }
                format!("Moved {n} counts")
            }
            Command::Status => {
                self.clock.advance(self.encoder.sampling_period_us());
                if let Some(status) = self.tick() {
                    self.reporter.print(&status)?;
                }
                return Ok(None);
            }
            Command::Quit => return Ok(None),
        };
        Ok(Some(reply))
    }
}

pub fn run(cfg: &Config, mode: DecodeMode, json: bool) -> eyre::Result<()> {
    let clock = ManualClock::new();
    let (encoder, source) = build_encoder(cfg, mode, Box::new(clock.clone()), None)?;
    if !json {
        println!("{}", banner(cfg, &encoder));
    }
    let mut session = Session {
        encoder,
        source,
        clock,
        reporter: Reporter::new(json, 1),
        carry: 0,
        travel: 0,
    };

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        match parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => {
                tracing::debug!(?cmd, "console command");
                if let Some(reply) = session.apply(cmd)? {
                    println!("{reply}");
                }
            }
            Err(reply) => println!("{reply}"),
        }
    }
    Ok(())
}
