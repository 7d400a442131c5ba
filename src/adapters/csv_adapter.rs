//! CSV file price history adapter.
//!
//! One file per ticker, `<base>/<ticker>.csv` (file name case is not
//! significant), with a `date,close` header and ISO dates. The close is
//! expected to be split/dividend adjusted.

use crate::domain::error::TrendbandError;
use crate::domain::price_table::{PricePoint, PriceTable};
use crate::ports::price_port::PriceHistoryPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<ticker>.csv` if present, otherwise a `.csv` file whose stem
    /// matches the ticker ignoring ASCII case. Tickers are uppercased at
    /// config load while files on disk may not be.
    fn csv_path(&self, ticker: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.is_file() {
            return exact;
        }
        fs::read_dir(&self.base_path)
            .ok()
            .and_then(|entries| {
                entries.filter_map(Result::ok).map(|e| e.path()).find(|p| {
                    p.extension().is_some_and(|ext| ext == "csv")
                        && p.file_stem()
                            .and_then(|stem| stem.to_str())
                            .is_some_and(|stem| stem.eq_ignore_ascii_case(ticker))
                })
            })
            .unwrap_or(exact)
    }

    fn read_series(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, TrendbandError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| TrendbandError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TrendbandError::PriceData {
                reason: format!("{}: CSV parse error: {}", ticker, e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TrendbandError::PriceData {
                reason: format!("{}: missing date column", ticker),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                TrendbandError::PriceData {
                    reason: format!("{}: invalid date '{}': {}", ticker, date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            // An empty close marks a non-trading or missing day.
            let close_str = record.get(1).map(str::trim).unwrap_or_default();
            if close_str.is_empty() {
                continue;
            }
            let close: f64 = close_str.parse().map_err(|e| TrendbandError::PriceData {
                reason: format!("{}: invalid close on row {}: {}", ticker, line + 1, e),
            })?;
            if !close.is_finite() || close <= 0.0 {
                return Err(TrendbandError::PriceData {
                    reason: format!(
                        "{}: close must be positive, got {} on {}",
                        ticker, close, date
                    ),
                });
            }

            points.push(PricePoint { date, close });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl PriceHistoryPort for CsvPriceAdapter {
    fn fetch(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, TrendbandError> {
        let mut series = HashMap::with_capacity(tickers.len());
        for ticker in tickers {
            let points = self.read_series(ticker, start_date, end_date)?;
            tracing::debug!(ticker = %ticker, rows = points.len(), "loaded price series");
            series.insert(ticker.clone(), points);
        }

        let table = PriceTable::from_series(tickers, &series);
        tracing::info!(
            tickers = tickers.len(),
            rows = table.len(),
            first = ?table.first_date(),
            last = ?table.last_date(),
            "price table built"
        );
        Ok(table)
    }
}
