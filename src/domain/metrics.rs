//! Performance metrics over a daily return series.

use crate::domain::replay::DailyReturn;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub cagr: f64,
    /// Largest peak-to-trough decline, as a non-positive fraction.
    pub max_drawdown: f64,
    pub total_return: f64,
    pub trading_days: usize,
}

impl PerformanceSummary {
    pub fn compute(returns: &[f64]) -> Self {
        PerformanceSummary {
            cagr: compute_cagr(returns),
            max_drawdown: compute_max_drawdown(returns),
            total_return: compound(returns) - 1.0,
            trading_days: returns.len(),
        }
    }

    pub fn from_daily(returns: &[DailyReturn]) -> Self {
        let values: Vec<f64> = returns.iter().map(|r| r.value).collect();
        Self::compute(&values)
    }
}

fn compound(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product()
}

/// Compound annual growth rate, annualised over 252 trading days.
/// An empty series yields 0.
pub fn compute_cagr(returns: &[f64]) -> f64 {
    let years = returns.len() as f64 / TRADING_DAYS_PER_YEAR;
    if years <= 0.0 {
        return 0.0;
    }
    compound(returns).powf(1.0 / years) - 1.0
}

/// Minimum of `equity / running_peak - 1` over the compounded equity curve
/// starting at 1.0.
pub fn compute_max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = equity / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
