//! Daily allocation signal engine.
//!
//! For each ticker and each configured window the latest close is compared
//! against the upper band `SMA(w) * (1 + N)`. Every strict break earns one
//! point; the point count is mapped to an exposure scalar and multiplied by
//! the ticker's base weight. Whatever is not invested is held as cash.
//!
//! Scores are recomputed from scratch each day. There is no lower-band exit
//! and no memory of the previous day's invested/flat state.

use crate::domain::band::{Band, BandPosition};
use crate::domain::error::TrendbandError;
use crate::domain::price_table::PriceTable;
use crate::domain::strategy::StrategyConfig;
use chrono::NaiveDate;

pub const CASH: &str = "Cash";

#[derive(Debug, Clone, PartialEq)]
pub struct BandReading {
    pub band: Band,
    pub position: BandPosition,
}

impl BandReading {
    pub fn scored(&self) -> bool {
        self.position == BandPosition::Above
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerSignal {
    pub ticker: String,
    pub latest: f64,
    pub prior: Option<f64>,
    pub score: usize,
    pub scalar: f64,
    pub base_weight: f64,
    pub weight: f64,
    pub readings: Vec<BandReading>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyAllocation {
    pub target_date: NaiveDate,
    pub effective_date: NaiveDate,
    pub signals: Vec<TickerSignal>,
    pub cash: f64,
    /// Return earned from the prior row to the effective row by the
    /// allocation computed here.
    pub prior_return: f64,
}

impl DailyAllocation {
    /// Ticker weights in configuration order, followed by the cash entry.
    pub fn weights(&self) -> Vec<(String, f64)> {
        self.signals
            .iter()
            .map(|s| (s.ticker.clone(), s.weight))
            .chain(std::iter::once((CASH.to_string(), self.cash)))
            .collect()
    }

    pub fn weight_of(&self, name: &str) -> Option<f64> {
        if name == CASH {
            return Some(self.cash);
        }
        self.signals
            .iter()
            .find(|s| s.ticker == name)
            .map(|s| s.weight)
    }

    pub fn invested(&self) -> f64 {
        self.signals.iter().map(|s| s.weight).sum()
    }
}

/// Compute the allocation for `target_date`, using the latest row dated on
/// or before it.
pub fn compute_allocation(
    table: &PriceTable,
    target_date: NaiveDate,
    config: &StrategyConfig,
) -> Result<DailyAllocation, TrendbandError> {
    let no_data = || TrendbandError::NoData {
        target: target_date.to_string(),
    };
    if table.is_empty() {
        return Err(no_data());
    }
    let index = table.effective_index(target_date).ok_or_else(no_data)?;

    let mut allocation = allocation_at(table, index, config)?;
    allocation.target_date = target_date;
    Ok(allocation)
}

/// Compute the allocation as of table row `index`.
pub fn allocation_at(
    table: &PriceTable,
    index: usize,
    config: &StrategyConfig,
) -> Result<DailyAllocation, TrendbandError> {
    let effective_date = table.dates()[index];
    let rows = index + 1;
    let required = config.required_rows();
    if rows < required {
        return Err(TrendbandError::InsufficientHistory { rows, required });
    }

    let prior_index = index.checked_sub(1);
    let mut signals = Vec::with_capacity(config.assets.len());

    for asset in &config.assets {
        let column = table
            .column_index(&asset.ticker)
            .ok_or_else(|| TrendbandError::NoData {
                target: effective_date.to_string(),
            })?;
        let history = table.history(column, index);
        let latest = table.close(column, index);

        let readings = score_readings(history, latest, &config.bands.windows, config.bands.width)
            .ok_or(TrendbandError::InsufficientHistory { rows, required })?;
        let score = readings.iter().filter(|r| r.scored()).count();
        let scalar = config
            .score_map
            .scalar_for(score)
            .ok_or_else(|| TrendbandError::UnmappedScore {
                ticker: asset.ticker.clone(),
                score,
            })?;

        signals.push(TickerSignal {
            ticker: asset.ticker.clone(),
            latest,
            prior: prior_index.map(|p| table.close(column, p)),
            score,
            scalar,
            base_weight: asset.base_weight,
            weight: scalar * asset.base_weight,
            readings,
        });
    }

    let invested: f64 = signals.iter().map(|s| s.weight).sum();
    let prior_return = signals
        .iter()
        .filter_map(|s| s.prior.map(|prior| s.weight * (s.latest / prior - 1.0)))
        .sum();

    tracing::debug!(
        date = %effective_date,
        invested,
        prior_return,
        "allocation computed"
    );

    Ok(DailyAllocation {
        target_date: effective_date,
        effective_date,
        signals,
        cash: 1.0 - invested,
        prior_return,
    })
}

/// One reading per window, in window order. `None` if any window is longer
/// than the available history.
pub fn score_readings(
    history: &[f64],
    latest: f64,
    windows: &[usize],
    width: f64,
) -> Option<Vec<BandReading>> {
    windows
        .iter()
        .map(|&window| {
            Band::compute(history, window, width).map(|band| BandReading {
                band,
                position: band.position(latest),
            })
        })
        .collect()
}

/// Return earned by holding the allocation's ticker weights from row `from`
/// to row `to`. Cash earns nothing.
pub fn holding_return(
    table: &PriceTable,
    allocation: &DailyAllocation,
    from: usize,
    to: usize,
) -> f64 {
    allocation
        .signals
        .iter()
        .filter_map(|s| {
            table
                .column_index(&s.ticker)
                .map(|c| s.weight * (table.close(c, to) / table.close(c, from) - 1.0))
        })
        .sum()
}
