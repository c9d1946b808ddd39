//! Derived metrics: NaN-aware series kernels, the derived column catalog,
//! frame decoration and correlation.

pub mod catalog;
pub mod correlation;
pub mod series;

pub use catalog::DerivedColumn;
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use series::{
    cumprod_skipna, last_valid, log_change, nan_mean, pct_change, pearson, ratio, rolling_mean,
    rolling_std,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PriceFrame;

/// Parameters for frame decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Trailing window for the rolling standard deviation.
    pub volatility_window: usize,
    pub trading_days: u32,
    /// Scale volatility by `sqrt(trading_days)`.
    pub annualize: bool,
    /// Append the extended ratio set after the standard columns.
    pub extended: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            volatility_window: 20,
            trading_days: 252,
            annualize: true,
            extended: false,
        }
    }
}

impl MetricsConfig {
    pub fn columns(&self) -> Vec<DerivedColumn> {
        let mut cols = DerivedColumn::STANDARD.to_vec();
        if self.extended {
            cols.extend(DerivedColumn::EXTENDED);
        }
        cols
    }
}

/// Append the configured derived columns to `frame` in catalog order.
///
/// Decorating twice is a no-op on the column set; values are recomputed.
pub fn decorate(frame: &mut PriceFrame, config: &MetricsConfig) {
    for column in config.columns() {
        let values = column.compute(&frame.bars, config);
        frame.push_derived(column, values);
    }
    debug!(
        symbol = %frame.symbol,
        rows = frame.len(),
        columns = frame.derived().len(),
        "decorated frame"
    );
}

/// Synthetic bars from close prices for tests.
///
/// open = previous close, high/low bracket the body by 1.0, adj close = close,
/// volume = 1000. Dates are consecutive calendar days from 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                adj_close: close,
                volume: 1000,
            }
        })
        .collect()
}
