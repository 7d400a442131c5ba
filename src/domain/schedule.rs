//! Run gating and target date resolution.

use chrono::{Datelike, Days, NaiveDate, Weekday};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunDecision {
    Run { target: NaiveDate },
    Skip { date: NaiveDate, reason: String },
}

/// Decide whether to run and for which date. An explicit `requested` date
/// always runs; otherwise `today` is used and weekends are skipped when
/// `skip_weekends` is set.
pub fn resolve_run(today: NaiveDate, requested: Option<NaiveDate>, skip_weekends: bool) -> RunDecision {
    if let Some(target) = requested {
        return RunDecision::Run { target };
    }
    if skip_weekends && is_weekend(today) {
        return RunDecision::Skip {
            date: today,
            reason: format!("{} is a {}, markets are closed", today, today.weekday()),
        };
    }
    RunDecision::Run { target: today }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Inclusive date range to request from the price provider so the target
/// date's row is included under either end-date convention.
pub fn fetch_window(history_start: NaiveDate, target: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = target.checked_add_days(Days::new(1)).unwrap_or(target);
    (history_start, end)
}
