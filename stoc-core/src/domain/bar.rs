//! Bar — one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar as delivered by a data provider.
///
/// Missing provider fields are stored as `f64::NAN` (volume as 0) so that
/// downstream arithmetic propagates gaps the same way a dataframe would.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl Bar {
    /// True if every price field is missing.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            && self.high.is_nan()
            && self.low.is_nan()
            && self.close.is_nan()
            && self.adj_close.is_nan()
    }

    /// Basic OHLC sanity: positive prices, high/low bracket open and close.
    pub fn is_sane(&self) -> bool {
        if self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            adj_close: 102.5,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn inverted_bar_is_not_sane() {
        let mut bar = sample_bar();
        bar.high = 90.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn void_needs_every_price_missing() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_void());
        assert!(!bar.is_sane());

        bar.open = f64::NAN;
        bar.high = f64::NAN;
        bar.low = f64::NAN;
        bar.adj_close = f64::NAN;
        assert!(bar.is_void());
    }
}
