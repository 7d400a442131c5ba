//! Price history port trait.

use crate::domain::error::TrendbandError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

pub trait PriceHistoryPort {
    /// Adjusted closes for `tickers` between `start_date` and `end_date`
    /// inclusive, aligned into a table with incomplete dates dropped.
    fn fetch(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, TrendbandError>;
}
