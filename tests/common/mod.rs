#![allow(dead_code)]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::cell::RefCell;
use trendband::domain::error::TrendbandError;
use trendband::domain::price_table::PriceTable;
use trendband::domain::strategy::StrategyConfig;
use trendband::ports::price_port::PriceHistoryPort;
use trendband::ports::report_port::ReportPort;

pub struct MockPriceSource {
    pub table: PriceTable,
    pub error: Option<String>,
    pub requests: RefCell<Vec<(NaiveDate, NaiveDate)>>,
}

impl MockPriceSource {
    pub fn new(table: PriceTable) -> Self {
        Self {
            table,
            error: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            table: PriceTable::from_rows(Vec::new(), Vec::new()),
            error: Some(reason.to_string()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl PriceHistoryPort for MockPriceSource {
    fn fetch(
        &self,
        _tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, TrendbandError> {
        self.requests.borrow_mut().push((start_date, end_date));
        if let Some(reason) = &self.error {
            return Err(TrendbandError::PriceData {
                reason: reason.clone(),
            });
        }
        Ok(self.table.clone())
    }
}

#[derive(Default)]
pub struct RecordingReport {
    pub reports: RefCell<Vec<String>>,
}

impl ReportPort for RecordingReport {
    fn deliver(&self, report: &str) -> Result<(), TrendbandError> {
        self.reports.borrow_mut().push(report.to_string());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive weekdays starting at `start` (or the next weekday).
pub fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = start;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day = day.checked_add_days(Days::new(1)).unwrap();
    }
    days
}

/// Table with one column per ticker; every column must have `dates.len()`
/// values.
pub fn make_table(tickers: &[String], dates: &[NaiveDate], columns: &[Vec<f64>]) -> PriceTable {
    let rows = dates.iter().enumerate().map(|(i, &d)| {
        (
            d,
            columns.iter().map(|c| Some(c[i])).collect::<Vec<_>>(),
        )
    });
    PriceTable::from_rows(tickers.to_vec(), rows)
}

/// `rows - 1` closes at 100.0 followed by `last`.
pub fn flat_then(rows: usize, last: f64) -> Vec<f64> {
    let mut closes = vec![100.0; rows - 1];
    closes.push(last);
    closes
}

/// Default-strategy fixture for the five default tickers over 200 trading
/// days from 2023-09-11 to 2024-06-14. Scores by ticker: 3, 2, 1, 0, 0.
pub fn graded_fixture() -> (StrategyConfig, Vec<NaiveDate>, PriceTable) {
    let config = StrategyConfig::default();
    let tickers = config.tickers();
    let dates = trading_days(date(2023, 9, 11), 200);

    // Breaks every band.
    let three = flat_then(200, 120.0);

    // 180 @ 100 then 20 @ 130: MA20 = 130 (no), MA120 = 105, MA200 = 103.
    let mut two = vec![100.0; 180];
    two.extend(vec![130.0; 20]);

    // 80 @ 50 then 120 @ 100: MA20 = MA120 = 100 (no), MA200 = 80.
    let mut one = vec![50.0; 80];
    one.extend(vec![100.0; 120]);

    let zero_down = flat_then(200, 90.0);
    let zero_flat = vec![100.0; 200];

    let table = make_table(
        &tickers,
        &dates,
        &[three, two, one, zero_down, zero_flat],
    );
    (config, dates, table)
}
