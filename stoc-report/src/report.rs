//! Report orchestration: load → decorate → score → explain.
//!
//! A report is built for one symbol on one exchange over one date range. The
//! ticker's own bars are required; the benchmark index, the volatility index
//! and the market capitalisation are fetched best effort and any failure ends
//! up in `warnings` rather than failing the report.

use std::collections::HashSet;

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use stoc_core::data::{DataProvider, DataSource, ParquetCache};
use stoc_core::domain::{Exchange, PriceFrame, VOLATILITY_INDEX};
use stoc_core::metrics::{correlation_matrix, decorate, CorrelationMatrix, MetricsConfig};

use crate::data_loader::{load_bars, LoadError, LoadOptions};
use crate::explain::{explain, Step};
use crate::scoring::{ScoreCard, ScoreInputs, ScoreWeights};

/// Shown to the user when the ticker yields no rows.
pub const NO_DATA_MESSAGE: &str = "No data found for the selected symbol and exchange.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No data found for the selected symbol and exchange.")]
    NoData { ticker: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub symbol: String,
    pub exchange: &'static Exchange,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRequest {
    pub fn new(
        symbol: impl Into<String>,
        exchange: &'static Exchange,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            start,
            end,
        }
    }

    /// Provider ticker: upper-cased symbol plus the exchange suffix.
    pub fn ticker(&self) -> String {
        self.exchange.ticker(&self.symbol)
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub request: ReportRequest,
    pub ticker: String,
    /// The decorated frame.
    pub frame: PriceFrame,
    pub source: DataSource,
    pub benchmark_ticker: &'static str,
    pub score: ScoreCard,
    pub steps: Vec<Step>,
    pub correlation: CorrelationMatrix,
    pub warnings: Vec<String>,
}

impl Report {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Everything a report needs besides the request itself.
pub struct ReportContext {
    pub cache: Option<ParquetCache>,
    pub provider: Option<Box<dyn DataProvider>>,
    pub offline: bool,
    pub synthetic: bool,
    pub force: bool,
    pub metrics: MetricsConfig,
    pub weights: ScoreWeights,
}

impl ReportContext {
    pub fn new(cache: Option<ParquetCache>, provider: Option<Box<dyn DataProvider>>) -> Self {
        Self {
            cache,
            provider,
            offline: false,
            synthetic: false,
            force: false,
            metrics: MetricsConfig::default(),
            weights: ScoreWeights::default(),
        }
    }

    fn load_options(&self, start: NaiveDate, end: NaiveDate) -> LoadOptions {
        LoadOptions {
            start,
            end,
            offline: self.offline,
            synthetic: self.synthetic,
            force: self.force,
        }
    }

    fn provider(&self) -> Option<&dyn DataProvider> {
        self.provider.as_deref()
    }

    /// Closes of an auxiliary series (benchmark, VIX). Never synthesised.
    fn auxiliary_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        warnings: &mut Vec<String>,
    ) -> Option<Vec<f64>> {
        let opts = LoadOptions {
            synthetic: false,
            force: false,
            ..self.load_options(start, end)
        };
        match load_bars(ticker, self.cache.as_ref(), self.provider(), &opts) {
            Ok(loaded) if !loaded.bars.is_empty() => {
                Some(loaded.bars.iter().map(|b| b.close).collect())
            }
            Ok(_) => {
                warnings.push(format!("{ticker}: no rows in range"));
                None
            }
            Err(e) => {
                warn!(ticker, error = %e, "auxiliary series unavailable");
                warnings.push(format!("{ticker}: {e}"));
                None
            }
        }
    }

    /// Shared series (benchmark, VIX) are loaded once, in order, so the
    /// parallel reports that follow read them from the cache.
    fn prefetch_auxiliary(&self, requests: &[ReportRequest]) {
        if self.cache.is_none() {
            return;
        }
        let mut seen = HashSet::new();
        for r in requests.iter().filter(|r| r.start <= r.end) {
            for ticker in [r.exchange.benchmark(), VOLATILITY_INDEX] {
                if seen.insert((ticker, r.start, r.end)) {
                    let mut ignored = Vec::new();
                    self.auxiliary_closes(ticker, r.start, r.end, &mut ignored);
                }
            }
        }
    }

    fn market_cap(&self, ticker: &str, warnings: &mut Vec<String>) -> Option<f64> {
        let cap = self
            .provider()
            .filter(|_| !self.offline)
            .and_then(|p| p.market_cap(ticker));
        if cap.is_none() {
            warnings.push(format!("{ticker}: market capitalisation unavailable, scored as 0"));
        }
        cap
    }
}

pub fn build_report(ctx: &ReportContext, request: &ReportRequest) -> Result<Report, ReportError> {
    if request.start > request.end {
        return Err(ReportError::InvalidRange {
            start: request.start,
            end: request.end,
        });
    }

    let ticker = request.ticker();
    info!(
        ticker = %ticker,
        exchange = request.exchange.name,
        start = %request.start,
        end = %request.end,
        "building report"
    );

    let loaded = load_bars(
        &ticker,
        ctx.cache.as_ref(),
        ctx.provider(),
        &ctx.load_options(request.start, request.end),
    )
    .map_err(|e| {
        if e.is_not_found() {
            ReportError::NoData {
                ticker: ticker.clone(),
            }
        } else {
            ReportError::Load(e)
        }
    })?;

    if loaded.bars.is_empty() {
        return Err(ReportError::NoData { ticker });
    }

    let mut warnings = loaded.warnings;
    let mut frame = PriceFrame::new(ticker.clone(), loaded.bars);
    decorate(&mut frame, &ctx.metrics);

    let benchmark_ticker = request.exchange.benchmark();
    let benchmark = ctx.auxiliary_closes(benchmark_ticker, request.start, request.end, &mut warnings);
    let vix = ctx.auxiliary_closes(VOLATILITY_INDEX, request.start, request.end, &mut warnings);
    let market_cap = ctx.market_cap(&ticker, &mut warnings);

    let score = ScoreCard::compute(
        &frame,
        ScoreInputs {
            market_cap,
            benchmark_closes: benchmark.as_deref(),
            vix_closes: vix.as_deref(),
        },
        &ctx.weights,
    );
    let steps = explain(&score, &ctx.metrics);
    let correlation = correlation_matrix(&frame);

    info!(
        ticker = %ticker,
        rows = frame.len(),
        overall = score.overall,
        warnings = warnings.len(),
        "report ready"
    );

    Ok(Report {
        request: request.clone(),
        ticker,
        frame,
        source: loaded.source,
        benchmark_ticker,
        score,
        steps,
        correlation,
        warnings,
    })
}

/// Independent reports in parallel; results keep the order of `requests`.
pub fn build_reports(
    ctx: &ReportContext,
    requests: &[ReportRequest],
) -> Vec<Result<Report, ReportError>> {
    if requests.len() > 1 {
        ctx.prefetch_auxiliary(requests);
    }
    requests.par_iter().map(|r| build_report(ctx, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoc_core::metrics::DerivedColumn;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn synthetic_ctx() -> ReportContext {
        ReportContext {
            offline: true,
            synthetic: true,
            ..ReportContext::new(None, None)
        }
    }

    fn nyse() -> &'static Exchange {
        Exchange::find("NYSE").unwrap()
    }

    #[test]
    fn synthetic_report_has_all_parts() {
        let ctx = synthetic_ctx();
        let request = ReportRequest::new("aapl", nyse(), d(2024, 1, 1), d(2024, 6, 30));
        let report = build_report(&ctx, &request).unwrap();

        assert_eq!(report.ticker, "AAPL");
        assert!(report.is_synthetic());
        assert_eq!(report.steps.len(), 9);
        assert!(report.frame.derived_values(DerivedColumn::Volatility).is_some());
        assert_eq!(report.correlation.len(), report.frame.numeric_columns().len());
        assert!(!report.score.benchmark_available);
        // synthetic notice, benchmark, VIX, market cap
        assert!(report.warnings.len() >= 4);
        assert_eq!(report.score.market_cap.score, 0.0);
    }

    #[test]
    fn suffix_is_applied() {
        let ctx = synthetic_ctx();
        let nse = Exchange::find("NSE").unwrap();
        let request = ReportRequest::new("reliance", nse, d(2024, 1, 1), d(2024, 2, 1));
        let report = build_report(&ctx, &request).unwrap();
        assert_eq!(report.ticker, "RELIANCE.NS");
        assert_eq!(report.benchmark_ticker, "^NSEI");
    }

    #[test]
    fn reversed_range_is_rejected() {
        let ctx = synthetic_ctx();
        let request = ReportRequest::new("AAPL", nyse(), d(2024, 6, 1), d(2024, 1, 1));
        assert!(matches!(
            build_report(&ctx, &request),
            Err(ReportError::InvalidRange { .. })
        ));
    }

    #[test]
    fn weekend_only_range_is_no_data() {
        let ctx = synthetic_ctx();
        // 2024-01-06 and 07 are Saturday and Sunday
        let request = ReportRequest::new("AAPL", nyse(), d(2024, 1, 6), d(2024, 1, 7));
        let err = build_report(&ctx, &request).unwrap_err();
        assert_eq!(err.to_string(), NO_DATA_MESSAGE);
    }

    #[test]
    fn offline_without_data_is_a_load_error() {
        let ctx = ReportContext {
            offline: true,
            ..ReportContext::new(None, None)
        };
        let request = ReportRequest::new("AAPL", nyse(), d(2024, 1, 1), d(2024, 2, 1));
        assert!(matches!(build_report(&ctx, &request), Err(ReportError::Load(_))));
    }

    #[test]
    fn batch_keeps_request_order() {
        let ctx = synthetic_ctx();
        let requests: Vec<_> = ["MSFT", "AAPL", "GOOG"]
            .iter()
            .map(|s| ReportRequest::new(*s, nyse(), d(2024, 1, 1), d(2024, 3, 1)))
            .collect();
        let reports = build_reports(&ctx, &requests);
        let tickers: Vec<_> = reports
            .iter()
            .map(|r| r.as_ref().unwrap().ticker.as_str())
            .collect();
        assert_eq!(tickers, ["MSFT", "AAPL", "GOOG"]);
    }
}
