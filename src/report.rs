// =============================================================================
// Reporter: line-oriented advice output
// =============================================================================

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::analysis::AnalysisReport;

pub trait Reporter {
    fn report(&mut self, report: &AnalysisReport) -> Result<()>;
}

/// Writes a short header, then `YYYY-MM-DD: <advice>` per row, oldest first.
pub struct LineReporter<W: Write> {
    out: W,
}

impl LineReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for LineReporter<W> {
    fn report(&mut self, report: &AnalysisReport) -> Result<()> {
        writeln!(
            self.out,
            "Buy/sell recommendations for {} ({} days, {} signal):",
            report.asset.display_name(),
            report.days,
            report.config.policy
        )
        .context("failed to write report header")?;

        for (row, advice) in report.entries() {
            writeln!(self.out, "{}: {}", row.day(), advice)
                .context("failed to write advice line")?;
        }

        self.out.flush().context("failed to flush report output")?;
        Ok(())
    }
}
