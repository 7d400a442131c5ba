//! Plain-text report rendering.

use crate::domain::metrics::PerformanceSummary;
use crate::domain::signal::{DailyAllocation, CASH};
use crate::domain::strategy::StrategyConfig;
use chrono::NaiveDate;

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn signed_pct(value: f64) -> String {
    format!("{:+.2}%", value * 100.0)
}

fn name_width(allocation: &DailyAllocation) -> usize {
    allocation
        .signals
        .iter()
        .map(|s| s.ticker.len())
        .chain(std::iter::once(CASH.len()))
        .max()
        .unwrap_or(CASH.len())
}

pub fn format_allocation(allocation: &DailyAllocation) -> String {
    let width = name_width(allocation);
    let mut out = String::new();

    out.push_str(&format!(
        "=== Daily allocation for {} ===\n",
        allocation.target_date
    ));
    if allocation.effective_date != allocation.target_date {
        out.push_str(&format!("Prices as of {}\n", allocation.effective_date));
    }
    out.push('\n');

    for signal in &allocation.signals {
        let bands: Vec<String> = signal
            .readings
            .iter()
            .map(|r| format!("MA{} {}", r.band.window, r.position))
            .collect();
        out.push_str(&format!(
            "  {:<width$}  {:>7}  score {}/{}  scalar {:.2}  [{}]\n",
            signal.ticker,
            pct(signal.weight),
            signal.score,
            signal.readings.len(),
            signal.scalar,
            bands.join(", "),
            width = width,
        ));
    }
    out.push_str(&format!(
        "  {:<width$}  {:>7}\n\n",
        CASH,
        pct(allocation.cash),
        width = width
    ));
    out.push_str(&format!(
        "Prior-day strategy return: {}",
        signed_pct(allocation.prior_return)
    ));
    out
}

pub fn format_failure(target_date: NaiveDate, reason: &str) -> String {
    format!(
        "=== Daily allocation for {} ===\n\nSignal generation FAILED\nReason: {}",
        target_date, reason
    )
}

pub fn format_skip(date: NaiveDate, reason: &str) -> String {
    format!("No run for {}: {}", date, reason)
}

pub fn format_performance(summary: &PerformanceSummary, start: NaiveDate, end: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Strategy performance {} to {} ===\n", start, end));
    out.push_str(&format!("CAGR:          {}\n", signed_pct(summary.cagr)));
    out.push_str(&format!("Max Drawdown:  {}\n", pct(summary.max_drawdown)));
    out.push_str(&format!("Total Return:  {}\n", signed_pct(summary.total_return)));
    out.push_str(&format!("Trading Days:  {}", summary.trading_days));
    out
}

pub fn format_strategy(strategy: &StrategyConfig) -> String {
    let mut out = String::from("Tickers:\n");
    for asset in &strategy.assets {
        out.push_str(&format!("  {}  base {}\n", asset.ticker, pct(asset.base_weight)));
    }
    let windows: Vec<String> = strategy.bands.windows.iter().map(|w| w.to_string()).collect();
    out.push_str(&format!("Band width:    {}\n", pct(strategy.bands.width)));
    out.push_str(&format!("MA windows:    {}\n", windows.join(", ")));
    out.push_str(&format!("Score scalars: {}", strategy.score_map));
    out
}
