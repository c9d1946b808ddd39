//! Bar loading with fallback.
//!
//! Resolution order for one ticker:
//! 1. Cache fully covers the range → use it
//! 2. Provider available and not offline → fetch, ingest, write to cache
//! 3. Partially covering cache → use what is there (with a warning)
//! 4. `synthetic` → deterministic random walk, tagged as synthetic
//! 5. Otherwise → fail with the most specific error seen

use chrono::{Datelike, NaiveDate};
use stoc_core::data::{
    ingest, CoverageResult, DataError, DataProvider, DataSource, ParquetCache,
};
use stoc_core::domain::Bar;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no cached data for '{symbol}' and no network access (use --synthetic for synthetic data)")]
    NoCachedDataOffline { symbol: String },

    #[error("could not load '{symbol}': {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

impl LoadError {
    /// The provider reported that the ticker does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LoadError::Fetch {
                source: DataError::SymbolNotFound { .. },
                ..
            } | LoadError::Data(DataError::SymbolNotFound { .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Skip the cache and refetch.
    pub force: bool,
}

impl LoadOptions {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            offline: false,
            synthetic: false,
            force: false,
        }
    }

    pub fn with_range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
    pub warnings: Vec<String>,
}

/// Load bars for one ticker over `opts.start ..= opts.end`.
pub fn load_bars(
    symbol: &str,
    cache: Option<&ParquetCache>,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedBars, LoadError> {
    let mut warnings = Vec::new();
    let loaded = |bars, source, warnings| LoadedBars {
        symbol: symbol.to_string(),
        bars,
        source,
        warnings,
    };

    let coverage = cache.map(|c| c.covers_range(symbol, opts.start, opts.end));

    // Step 1: fresh cache
    if let (Some(c), Some(CoverageResult::FullyCovered), false) = (cache, &coverage, opts.force) {
        match c.load_range(symbol, opts.start, opts.end) {
            Ok(bars) => return Ok(loaded(bars, DataSource::Cache, warnings)),
            Err(e) => warn!(symbol, error = %e, "cache unreadable, refetching"),
        }
    }

    // Step 2: provider
    let mut last_error = None;
    if !opts.offline {
        if let Some(p) = provider.filter(|p| p.is_available()) {
            match p.fetch(symbol, opts.start, opts.end) {
                Ok(fetched) => {
                    let ingested = ingest(fetched.bars);
                    warnings.extend(ingested.warnings);
                    if let Some(c) = cache.filter(|_| !ingested.bars.is_empty()) {
                        let written = c.write_range(
                            symbol,
                            &ingested.bars,
                            fetched.source,
                            opts.start,
                            opts.end,
                        );
                        if let Err(e) = written {
                            warn!(symbol, error = %e, "failed to cache bars");
                        }
                    }
                    return Ok(loaded(ingested.bars, fetched.source, warnings));
                }
                Err(e) => {
                    warn!(symbol, provider = p.name(), error = %e, "fetch failed");
                    last_error = Some(e);
                }
            }
        } else if provider.is_some() {
            last_error = Some(DataError::CircuitBreakerTripped);
        }
    }

    // Step 3: partial cache
    if let (Some(c), Some(CoverageResult::PartiallyCovered { cached_start, cached_end })) =
        (cache, &coverage)
    {
        if let Ok(bars) = c.load_range(symbol, opts.start, opts.end) {
            if !bars.is_empty() {
                warnings.push(format!(
                    "using cached data for {symbol} ({cached_start} to {cached_end}), which does not cover the full range"
                ));
                return Ok(loaded(bars, DataSource::Cache, warnings));
            }
        }
    }

    // Step 4: synthetic
    if opts.synthetic {
        warn!(symbol, "generating synthetic data, results are tagged as synthetic");
        warnings.push(format!("{symbol}: synthetic data, not market prices"));
        let bars = generate_synthetic_bars(symbol, opts.start, opts.end);
        return Ok(loaded(bars, DataSource::Synthetic, warnings));
    }

    // Step 5: fail
    info!(symbol, "no data available");
    Err(match last_error {
        Some(source) => LoadError::Fetch {
            symbol: symbol.to_string(),
            source,
        },
        None => LoadError::NoCachedDataOffline {
            symbol: symbol.to_string(),
        },
    })
}

/// Deterministic weekday random walk from 100.0, seeded by the ticker.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                adj_close: close,
                volume,
            });
            price = close;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    bars
}
