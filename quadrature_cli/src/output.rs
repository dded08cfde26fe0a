//! Status line rendering: text, JSON lines and CSV rows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use eyre::WrapErr;
use quadrature_core::VelocityEstimate;
use serde::Serialize;

/// One reported tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Status {
    pub t_us: u64,
    pub position: i64,
    pub cps: f32,
    pub rpm: f32,
    pub index: bool,
    pub window_cps: f32,
    pub edge_cps: Option<f32>,
    pub stalled: bool,
}

impl Status {
    pub fn new(t_us: u64, position: i64, est: &VelocityEstimate, index: bool) -> Self {
        Self {
            t_us,
            position,
            cps: est.filtered_cps,
            rpm: est.rpm,
            index,
            window_cps: est.window_cps,
            edge_cps: est.edge_cps,
            stalled: est.stalled,
        }
    }

    /// `Pos=<counts> cps=<rate> rpm=<rpm>`, with ` Z` when the index was seen.
    pub fn line(&self) -> String {
        let mut s = format!(
            "Pos={} cps={:.1} rpm={:.2}",
            self.position, self.cps, self.rpm
        );
        if self.index {
            s.push_str(" Z");
        }
        s
    }
}

/// Writes statuses to stdout (text or JSON) and optionally to a CSV file.
pub struct Reporter {
    json: bool,
    every: u32,
    seen: u64,
    csv: Option<csv::Writer<File>>,
}

impl Reporter {
    pub fn new(json: bool, every: u32) -> Self {
        Self {
            json,
            every: every.max(1),
            seen: 0,
            csv: None,
        }
    }

    pub fn with_csv(mut self, path: &Path) -> eyre::Result<Self> {
        let w = csv::Writer::from_path(path)
            .wrap_err_with(|| format!("failed to create CSV {}", path.display()))?;
        self.csv = Some(w);
        Ok(self)
    }

    /// Record one tick. Every tick goes to the CSV; stdout gets every Nth.
    pub fn report(&mut self, status: &Status) -> eyre::Result<()> {
        self.seen += 1;
        if let Some(w) = self.csv.as_mut() {
            w.serialize(status).wrap_err("failed to write CSV row")?;
        }
        if self.seen % u64::from(self.every) == 0 {
            self.print(status)?;
        }
        Ok(())
    }

    /// Print unconditionally (console STATUS).
    pub fn print(&self, status: &Status) -> eyre::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = serde_json::to_string(status).wrap_err("failed to encode status")?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{}", status.line())?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> eyre::Result<()> {
        if let Some(w) = self.csv.as_mut() {
            w.flush().wrap_err("failed to flush CSV")?;
        }
        Ok(())
    }
}
