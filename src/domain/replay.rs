//! Historical replay of the daily signal.
//!
//! Weights decided at the close of row `p` are held until the close of the
//! next row `p + 1`; that row's return is what the strategy earned. Rows
//! whose predecessor lacks enough history for the longest window are
//! skipped.

use crate::domain::error::TrendbandError;
use crate::domain::price_table::PriceTable;
use crate::domain::signal::{allocation_at, holding_return};
use crate::domain::strategy::StrategyConfig;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub value: f64,
}

/// Strategy returns for every trading date in `[start, end]`.
pub fn replay(
    table: &PriceTable,
    config: &StrategyConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyReturn>, TrendbandError> {
    if table.is_empty() {
        return Err(TrendbandError::NoData {
            target: end.to_string(),
        });
    }

    let required = config.required_rows();
    let mut returns = Vec::new();

    for (index, &date) in table.dates().iter().enumerate().skip(required) {
        if date < start {
            continue;
        }
        if date > end {
            break;
        }
        let held = allocation_at(table, index - 1, config)?;
        returns.push(DailyReturn {
            date,
            value: holding_return(table, &held, index - 1, index),
        });
    }

    if returns.is_empty() {
        return Err(TrendbandError::InsufficientHistory {
            rows: table.len(),
            required: required + 1,
        });
    }

    tracing::info!(
        days = returns.len(),
        first = %returns[0].date,
        last = %returns[returns.len() - 1].date,
        "replay complete"
    );

    Ok(returns)
}
