//! Download orchestrator: multi-ticker fetch → ingest → cache with progress reporting.

use chrono::NaiveDate;

use super::cache::{CoverageResult, ParquetCache};
use super::ingest;
use super::provider::{DataError, DataProvider, DownloadProgress};

/// Download several tickers, running each through ingest and into the cache.
///
/// Tickers already fully covered are skipped unless `force` is set. Once the
/// provider reports itself unavailable the rest of the batch fails fast.
pub fn download_symbols(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && cache.covers_range(symbol, start, end) == CoverageResult::FullyCovered {
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, cache, symbol, start, end);
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..] {
                errors.push((sym.to_string(), DataError::CircuitBreakerTripped));
                failed += 1;
            }
            break;
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Fetch one ticker, ingest it and cache it.
pub fn download_single(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol, start, end)?;
    let ingested = ingest::ingest(fetched.bars);
    if ingested.bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    cache.write_range(symbol, &ingested.bars, fetched.source, start, end)
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataSource, FetchResult};
    use crate::domain::Bar;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeProvider {
        calls: AtomicUsize,
        available: AtomicBool,
        block_after_first: bool,
    }

    impl FakeProvider {
        fn new(block_after_first: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                available: AtomicBool::new(true),
                block_after_first,
            }
        }
    }

    impl DataProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch(&self, symbol: &str, start: NaiveDate, _end: NaiveDate) -> Result<FetchResult, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.block_after_first {
                self.available.store(false, Ordering::SeqCst);
            }
            if symbol == "MISSING" {
                return Err(DataError::SymbolNotFound { symbol: symbol.into() });
            }
            Ok(FetchResult {
                symbol: symbol.into(),
                bars: vec![Bar {
                    date: start,
                    open: 1.0,
                    high: 2.0,
                    low: 0.5,
                    close: 1.5,
                    adj_close: 1.5,
                    volume: 10,
                }],
                source: DataSource::Synthetic,
            })
        }

        fn is_available(&self) -> bool {
            self.available.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl DownloadProgress for RecordingProgress {
        fn on_start(&self, symbol: &str, _: usize, _: usize) {
            self.events.lock().unwrap().push(format!("start {symbol}"));
        }
        fn on_complete(&self, symbol: &str, _: usize, _: usize, result: &Result<(), DataError>) {
            let tag = if result.is_ok() { "ok" } else { "fail" };
            self.events.lock().unwrap().push(format!("{tag} {symbol}"));
        }
        fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {succeeded}/{failed}/{total}"));
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn downloads_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let provider = FakeProvider::new(false);
        let progress = RecordingProgress::default();

        let summary = download_symbols(&provider, &cache, &["AAPL", "MISSING"], d(2), d(2), false, &progress);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.errors[0].0, "MISSING");
        assert!(cache.load("AAPL").is_ok());

        let events = progress.events.lock().unwrap();
        assert_eq!(events.last().unwrap(), "done 1/1/2");
    }

    #[test]
    fn fresh_cache_is_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let provider = FakeProvider::new(false);

        download_symbols(&provider, &cache, &["AAPL"], d(2), d(2), false, &RecordingProgress::default());
        download_symbols(&provider, &cache, &["AAPL"], d(2), d(2), false, &RecordingProgress::default());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        download_symbols(&provider, &cache, &["AAPL"], d(2), d(2), true, &RecordingProgress::default());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn range_ending_on_a_weekend_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let provider = FakeProvider::new(false);

        // the fake returns one bar on the start date; 2024-01-07 is a Sunday
        download_symbols(&provider, &cache, &["AAPL"], d(2), d(7), false, &RecordingProgress::default());
        download_symbols(&provider, &cache, &["AAPL"], d(2), d(7), false, &RecordingProgress::default());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unavailable_provider_fails_rest_of_batch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let provider = FakeProvider::new(true);

        let summary = download_symbols(
            &provider,
            &cache,
            &["AAPL", "MSFT", "IBM"],
            d(2),
            d(2),
            false,
            &RecordingProgress::default(),
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert!(matches!(summary.errors[0].1, DataError::CircuitBreakerTripped));
    }
}
