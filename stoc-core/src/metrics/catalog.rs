//! Derived column catalog.
//!
//! Each column is a row-wise expression over the base OHLCV columns. The
//! formulas are reproduced as the dashboards defined them, including the ones
//! that are not meaningful finance (`Debt`, `Debt Ratio`).

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::series::{cumprod_skipna, log_change, pct_change, ratio, rolling_std};
use super::MetricsConfig;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedColumn {
    Return,
    Volatility,
    MarketCap,
    GrowthRate,
    LogReturn,
    IntradayReturn,
    OvernightGap,
    PriceRange,
    CloseLocation,
    DollarVolume,
    VolumeChange,
    AdjustmentFactor,
    Debt,
    DebtRatio,
}

impl DerivedColumn {
    /// Columns every report carries.
    pub const STANDARD: [DerivedColumn; 4] = [
        DerivedColumn::Return,
        DerivedColumn::Volatility,
        DerivedColumn::MarketCap,
        DerivedColumn::GrowthRate,
    ];

    /// Additional ratios, enabled through `MetricsConfig::extended`.
    pub const EXTENDED: [DerivedColumn; 10] = [
        DerivedColumn::LogReturn,
        DerivedColumn::IntradayReturn,
        DerivedColumn::OvernightGap,
        DerivedColumn::PriceRange,
        DerivedColumn::CloseLocation,
        DerivedColumn::DollarVolume,
        DerivedColumn::VolumeChange,
        DerivedColumn::AdjustmentFactor,
        DerivedColumn::Debt,
        DerivedColumn::DebtRatio,
    ];

    pub fn all() -> impl Iterator<Item = DerivedColumn> {
        Self::STANDARD.into_iter().chain(Self::EXTENDED)
    }

    /// Column header used in tables, charts and CSV export.
    pub fn label(self) -> &'static str {
        match self {
            DerivedColumn::Return => "Return",
            DerivedColumn::Volatility => "Volatility",
            DerivedColumn::MarketCap => "Market Capitalization",
            DerivedColumn::GrowthRate => "Compounded Daily Growth Rate",
            DerivedColumn::LogReturn => "Log Return",
            DerivedColumn::IntradayReturn => "Intraday Return",
            DerivedColumn::OvernightGap => "Overnight Gap",
            DerivedColumn::PriceRange => "Price Range",
            DerivedColumn::CloseLocation => "Close Location",
            DerivedColumn::DollarVolume => "Dollar Volume",
            DerivedColumn::VolumeChange => "Volume Change",
            DerivedColumn::AdjustmentFactor => "Adjustment Factor",
            DerivedColumn::Debt => "Debt",
            DerivedColumn::DebtRatio => "Debt Ratio",
        }
    }

    /// Formula text. Volatility reflects the configured window and scaling.
    pub fn formula(self, config: &MetricsConfig) -> Cow<'static, str> {
        let text = match self {
            DerivedColumn::Return => "(Close[t] - Close[t-1]) / Close[t-1]",
            DerivedColumn::Volatility => {
                let window = config.volatility_window;
                return if config.annualize {
                    format!("std(Return, {window}) * sqrt({})", config.trading_days).into()
                } else {
                    format!("std(Return, {window})").into()
                };
            }
            DerivedColumn::MarketCap => "(High + Low) / 2 * Volume",
            DerivedColumn::GrowthRate => "cumprod(1 + Return)",
            DerivedColumn::LogReturn => "ln(Close[t] / Close[t-1])",
            DerivedColumn::IntradayReturn => "(Close - Open) / Open",
            DerivedColumn::OvernightGap => "(Open[t] - Close[t-1]) / Close[t-1]",
            DerivedColumn::PriceRange => "High - Low",
            DerivedColumn::CloseLocation => "(Close - Low) / (High - Low)",
            DerivedColumn::DollarVolume => "Close * Volume",
            DerivedColumn::VolumeChange => "(Volume[t] - Volume[t-1]) / Volume[t-1]",
            DerivedColumn::AdjustmentFactor => "Adj Close / Close",
            DerivedColumn::Debt => "(Close - Adj Close) * Volume",
            DerivedColumn::DebtRatio => "Debt / Market Capitalization",
        };
        Cow::Borrowed(text)
    }

    /// Look a column up by its display label.
    pub fn from_label(label: &str) -> Option<DerivedColumn> {
        Self::all().find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Evaluate the column over `bars`. The result has one value per bar.
    pub fn compute(self, bars: &[Bar], config: &MetricsConfig) -> Vec<f64> {
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        match self {
            DerivedColumn::Return => pct_change(&close),
            DerivedColumn::Volatility => {
                let scale = if config.annualize {
                    (config.trading_days as f64).sqrt()
                } else {
                    1.0
                };
                rolling_std(&pct_change(&close), config.volatility_window)
                    .into_iter()
                    .map(|v| v * scale)
                    .collect()
            }
            DerivedColumn::MarketCap => bars.iter().map(midpoint_cap).collect(),
            DerivedColumn::GrowthRate => {
                let gross: Vec<f64> = pct_change(&close).iter().map(|r| 1.0 + r).collect();
                cumprod_skipna(&gross)
            }
            DerivedColumn::LogReturn => log_change(&close),
            DerivedColumn::IntradayReturn => bars
                .iter()
                .map(|b| ratio(b.close - b.open, b.open))
                .collect(),
            DerivedColumn::OvernightGap => {
                let mut out = vec![f64::NAN; bars.len()];
                for i in 1..bars.len() {
                    out[i] = ratio(bars[i].open - bars[i - 1].close, bars[i - 1].close);
                }
                out
            }
            DerivedColumn::PriceRange => bars.iter().map(|b| b.high - b.low).collect(),
            DerivedColumn::CloseLocation => bars
                .iter()
                .map(|b| ratio(b.close - b.low, b.high - b.low))
                .collect(),
            DerivedColumn::DollarVolume => {
                bars.iter().map(|b| b.close * b.volume as f64).collect()
            }
            DerivedColumn::VolumeChange => {
                let volume: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
                pct_change(&volume)
            }
            DerivedColumn::AdjustmentFactor => {
                bars.iter().map(|b| ratio(b.adj_close, b.close)).collect()
            }
            DerivedColumn::Debt => bars.iter().map(debt).collect(),
            DerivedColumn::DebtRatio => bars
                .iter()
                .map(|b| ratio(debt(b), midpoint_cap(b)))
                .collect(),
        }
    }
}

impl std::fmt::Display for DerivedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn midpoint_cap(b: &Bar) -> f64 {
    (b.high + b.low) / 2.0 * b.volume as f64
}

fn debt(b: &Bar) -> f64 {
    (b.close - b.adj_close) * b.volume as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::make_bars;

    const EPS: f64 = 1e-9;

    fn bar(open: f64, high: f64, low: f64, close: f64, adj: f64, volume: u64) -> Bar {
        Bar {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
            adj_close: adj,
            volume,
        }
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = DerivedColumn::all().map(|c| c.label()).collect();
        let n = labels.len();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), n);
        assert_eq!(n, 14);
    }

    #[test]
    fn volatility_formula_follows_config() {
        let default = MetricsConfig::default();
        assert_eq!(
            DerivedColumn::Volatility.formula(&default),
            "std(Return, 20) * sqrt(252)"
        );

        let weekly = MetricsConfig {
            trading_days: 260,
            volatility_window: 5,
            ..MetricsConfig::default()
        };
        assert_eq!(
            DerivedColumn::Volatility.formula(&weekly),
            "std(Return, 5) * sqrt(260)"
        );

        let raw = MetricsConfig {
            annualize: false,
            ..MetricsConfig::default()
        };
        assert_eq!(DerivedColumn::Volatility.formula(&raw), "std(Return, 20)");
        assert_eq!(DerivedColumn::PriceRange.formula(&raw), "High - Low");
    }

    #[test]
    fn from_label_round_trips() {
        for c in DerivedColumn::all() {
            assert_eq!(DerivedColumn::from_label(c.label()), Some(c));
        }
        assert_eq!(DerivedColumn::from_label("debt ratio"), Some(DerivedColumn::DebtRatio));
        assert_eq!(DerivedColumn::from_label("Sharpe"), None);
    }

    #[test]
    fn return_literal_row() {
        let bars = make_bars(&[100.0, 105.0]);
        let r = DerivedColumn::Return.compute(&bars, &MetricsConfig::default());
        assert!(r[0].is_nan());
        assert!((r[1] - 0.05).abs() < EPS);
    }

    #[test]
    fn market_cap_is_midpoint_times_volume() {
        let bars = vec![bar(10.0, 12.0, 8.0, 11.0, 11.0, 1_000)];
        let cap = DerivedColumn::MarketCap.compute(&bars, &MetricsConfig::default());
        assert!((cap[0] - 10_000.0).abs() < EPS);
    }

    #[test]
    fn growth_rate_compounds_returns() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let g = DerivedColumn::GrowthRate.compute(&bars, &MetricsConfig::default());
        assert!(g[0].is_nan());
        assert!((g[1] - 1.1).abs() < EPS);
        assert!((g[2] - 1.21).abs() < EPS);
    }

    #[test]
    fn volatility_annualisation_toggle() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        let bars = make_bars(&closes);
        let raw = MetricsConfig {
            annualize: false,
            volatility_window: 5,
            ..MetricsConfig::default()
        };
        let annual = MetricsConfig {
            annualize: true,
            ..raw.clone()
        };
        let v_raw = DerivedColumn::Volatility.compute(&bars, &raw);
        let v_ann = DerivedColumn::Volatility.compute(&bars, &annual);
        // first return is NaN, so the first full window ends at index 5
        assert!(v_raw[4].is_nan());
        assert!(!v_raw[5].is_nan());
        assert!((v_ann[10] - v_raw[10] * 252f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn debt_reproduces_close_minus_adjusted() {
        let bars = vec![bar(10.0, 12.0, 8.0, 11.0, 10.0, 500)];
        let cfg = MetricsConfig::default();
        let debt = DerivedColumn::Debt.compute(&bars, &cfg);
        let ratio = DerivedColumn::DebtRatio.compute(&bars, &cfg);
        assert!((debt[0] - 500.0).abs() < EPS);
        assert!((ratio[0] - 500.0 / 5_000.0).abs() < EPS);
    }

    #[test]
    fn close_location_flat_bar_is_nan() {
        let bars = vec![bar(10.0, 10.0, 10.0, 10.0, 10.0, 1)];
        let loc = DerivedColumn::CloseLocation.compute(&bars, &MetricsConfig::default());
        assert!(loc[0].is_nan());
    }

    #[test]
    fn overnight_gap_uses_previous_close() {
        let bars = vec![
            bar(10.0, 11.0, 9.0, 10.0, 10.0, 1),
            bar(11.0, 12.0, 10.0, 11.5, 11.5, 1),
        ];
        let gap = DerivedColumn::OvernightGap.compute(&bars, &MetricsConfig::default());
        assert!(gap[0].is_nan());
        assert!((gap[1] - 0.1).abs() < EPS);
    }

    #[test]
    fn every_column_matches_bar_count() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 2.5]);
        let cfg = MetricsConfig::default();
        for c in DerivedColumn::all() {
            assert_eq!(c.compute(&bars, &cfg).len(), bars.len(), "{c}");
        }
    }
}
