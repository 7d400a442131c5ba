//! Report delivery port trait.

use crate::domain::error::TrendbandError;

/// Port for delivering a rendered report to its channel.
pub trait ReportPort {
    fn deliver(&self, report: &str) -> Result<(), TrendbandError>;
}
