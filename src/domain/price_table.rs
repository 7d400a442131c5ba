//! Date-aligned closing price table.
//!
//! Prices arrive per ticker as `PricePoint` series; `PriceTable` aligns them
//! on a shared, strictly increasing date axis and drops every date that is
//! missing a price for any ticker. Closes are stored column-major so a
//! ticker's trailing window is a contiguous slice.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Align per-ticker series into a table whose columns follow `tickers`.
    /// A ticker absent from `series` leaves the table empty.
    pub fn from_series(tickers: &[String], series: &HashMap<String, Vec<PricePoint>>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

        for (col, ticker) in tickers.iter().enumerate() {
            let Some(points) = series.get(ticker) else {
                continue;
            };
            for point in points {
                let row = by_date
                    .entry(point.date)
                    .or_insert_with(|| vec![None; tickers.len()]);
                row[col] = Some(point.close);
            }
        }

        Self::from_rows(tickers.to_vec(), by_date)
    }

    /// Build from date-keyed rows; rows with any missing value are dropped.
    pub fn from_rows<I>(tickers: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Vec<Option<f64>>)>,
    {
        let sorted: BTreeMap<NaiveDate, Vec<Option<f64>>> = rows.into_iter().collect();
        let mut dates = Vec::with_capacity(sorted.len());
        let mut columns = vec![Vec::with_capacity(sorted.len()); tickers.len()];

        for (date, row) in sorted {
            if row.len() != tickers.len() || row.iter().any(Option::is_none) {
                continue;
            }
            dates.push(date);
            for (col, value) in row.into_iter().flatten().enumerate() {
                columns[col].push(value);
            }
        }

        Self {
            tickers,
            dates,
            columns,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column_index(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Index of the latest row dated on or before `target`.
    pub fn effective_index(&self, target: NaiveDate) -> Option<usize> {
        self.dates.partition_point(|d| *d <= target).checked_sub(1)
    }

    pub fn close(&self, column: usize, row: usize) -> f64 {
        self.columns[column][row]
    }

    /// The `window` closes of `column` ending at and including row `end`,
    /// or `None` when fewer rows exist.
    pub fn trailing(&self, column: usize, end: usize, window: usize) -> Option<&[f64]> {
        if window == 0 || end >= self.dates.len() || end + 1 < window {
            return None;
        }
        Some(&self.columns[column][end + 1 - window..=end])
    }

    /// All closes of `column` up to and including row `end`.
    pub fn history(&self, column: usize, end: usize) -> &[f64] {
        &self.columns[column][..=end]
    }
}
