//! Delivery of rendered reports on standard output.

use crate::domain::error::TrendbandError;
use crate::ports::report_port::ReportPort;
use std::io::Write;

/// Writes each report to stdout, where the scheduling system captures it.
pub struct StdoutReport;

impl ReportPort for StdoutReport {
    fn deliver(&self, report: &str) -> Result<(), TrendbandError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", report)?;
        stdout.flush()?;
        Ok(())
    }
}
