//! Parquet cache with Hive-style partitioning.
//!
//! Layout: `{cache_dir}/symbol={TICKER}/{year}.parquet`
//!
//! - Atomic writes (unique temp file per write, renamed into place), safe
//!   for concurrent writers of the same ticker
//! - Integrity validation on load (schema check, row count > 0)
//! - Quarantine for corrupt files (`{file}.quarantined`)
//! - Metadata sidecar per ticker (hash, date range, source)

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::{DataError, DataSource};
use crate::domain::Bar;

const SYMBOL_PREFIX: &str = "symbol=";
const META_FILE: &str = "meta.json";

/// Metadata sidecar for a cached ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: String,
    pub cached_at: NaiveDateTime,
    /// Range asked of the provider. Wider than the bar dates when it starts
    /// or ends on a weekend or holiday.
    #[serde(default)]
    pub requested_start: Option<NaiveDate>,
    #[serde(default)]
    pub requested_end: Option<NaiveDate>,
}

impl CacheMeta {
    /// Dates the cached data answers for. The requested end never counts
    /// past the day the data was written.
    pub fn covered(&self) -> (NaiveDate, NaiveDate) {
        let start = self
            .requested_start
            .map_or(self.start_date, |r| r.min(self.start_date));
        let end = self.requested_end.map_or(self.end_date, |r| {
            r.min(self.cached_at.date()).max(self.end_date)
        });
        (start, end)
    }
}

/// One ticker directory as found on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub symbol: String,
    pub path: PathBuf,
    /// `None` when the sidecar is missing or unreadable.
    pub meta: Option<CacheMeta>,
    pub size_bytes: u64,
}

pub struct ParquetCache {
    cache_dir: PathBuf,
}

impl ParquetCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("{SYMBOL_PREFIX}{symbol}"))
    }

    fn year_path(&self, symbol: &str, year: i32) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{year}.parquet"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join(META_FILE)
    }

    /// Write bars for a ticker, one Parquet file per calendar year.
    ///
    /// `bars` must be sorted by date (the ingest pipeline guarantees it).
    pub fn write(&self, symbol: &str, bars: &[Bar], source: DataSource) -> Result<(), DataError> {
        self.write_inner(symbol, bars, source, None)
    }

    /// Write bars fetched for `[start, end]`; the sidecar remembers the
    /// requested range so edge days without trading still count as covered.
    pub fn write_range(
        &self,
        symbol: &str,
        bars: &[Bar],
        source: DataSource,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), DataError> {
        self.write_inner(symbol, bars, source, Some((start, end)))
    }

    fn write_inner(
        &self,
        symbol: &str,
        bars: &[Bar],
        source: DataSource,
        requested: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<(), DataError> {
        let (first, last) = match (bars.first(), bars.last()) {
            (Some(f), Some(l)) => (f.date, l.date),
            _ => return Err(DataError::CacheError("no bars to cache".into())),
        };

        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let mut by_year: BTreeMap<i32, Vec<&Bar>> = BTreeMap::new();
        for bar in bars {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let mut df = bars_to_dataframe(year_bars)?;
            let path = self.year_path(symbol, *year);
            persist_atomically(&sym_dir, &path, |file| write_parquet(&mut df, file))?;
        }

        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date: first,
            end_date: last,
            bar_count: bars.len(),
            data_hash: hash_bars(bars)?,
            source: source.label().to_string(),
            cached_at: chrono::Local::now().naive_local(),
            requested_start: requested.map(|(s, _)| s),
            requested_end: requested.map(|(_, e)| e),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        persist_atomically(&sym_dir, &self.meta_path(symbol), |file| {
            file.write_all(meta_json.as_bytes())
                .map_err(|e| DataError::CacheError(format!("meta write: {e}")))
        })?;

        debug!(symbol, bars = bars.len(), years = by_year.len(), "cached");
        Ok(())
    }

    /// Load all cached bars for a ticker, sorted by date ascending.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let sym_dir = self.symbol_dir(symbol);
        if !sym_dir.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        let entries =
            fs::read_dir(&sym_dir).map_err(|e| DataError::CacheError(format!("read dir: {e}")))?;

        let mut all_bars = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::CacheError(format!("dir entry: {e}")))?;
            let path = entry.path();

            // meta.json, *.quarantined, stray *.tmp
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }

            match load_and_validate_parquet(&path) {
                Ok(bars) => all_bars.extend(bars),
                Err(e) => {
                    let quarantine = path.with_extension("parquet.quarantined");
                    warn!(path = %path.display(), error = %e, "quarantining corrupt cache file");
                    let _ = fs::rename(&path, &quarantine);
                }
            }
        }

        if all_bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        all_bars.sort_by_key(|b| b.date);
        Ok(all_bars)
    }

    /// Cached bars restricted to `[start, end]`.
    pub fn load_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let mut bars = self.load(symbol)?;
        bars.retain(|b| b.date >= start && b.date <= end);
        Ok(bars)
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Check which symbols have cached data, and their date ranges.
    pub fn status(&self, symbols: &[&str]) -> Vec<CacheStatus> {
        symbols
            .iter()
            .map(|sym| {
                let meta = self.get_meta(sym);
                CacheStatus {
                    symbol: sym.to_string(),
                    cached: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                }
            })
            .collect()
    }

    pub fn covers_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> CoverageResult {
        let Some(meta) = self.get_meta(symbol) else {
            return CoverageResult::NotCached;
        };
        let (cached_start, cached_end) = meta.covered();
        if cached_start <= start && cached_end >= end {
            CoverageResult::FullyCovered
        } else {
            CoverageResult::PartiallyCovered {
                cached_start,
                cached_end,
            }
        }
    }

    /// Every ticker directory under the cache root, sorted by symbol.
    pub fn entries(&self) -> Result<Vec<CacheEntry>, DataError> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let dir = fs::read_dir(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("read dir: {e}")))?;

        let mut out = Vec::new();
        for entry in dir.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(symbol) = name.strip_prefix(SYMBOL_PREFIX) else {
                continue;
            };
            let path = entry.path();
            out.push(CacheEntry {
                symbol: symbol.to_string(),
                meta: self.get_meta(symbol),
                size_bytes: dir_size(&path),
                path,
            });
        }
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(out)
    }

    /// Entries whose sidecar says they were cached before `cutoff`.
    ///
    /// Entries with unreadable metadata are never considered stale.
    pub fn stale_entries(&self, cutoff: NaiveDateTime) -> Result<Vec<CacheEntry>, DataError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.meta.as_ref().is_some_and(|m| m.cached_at < cutoff))
            .collect())
    }

    pub fn remove(&self, symbol: &str) -> Result<(), DataError> {
        let dir = self.symbol_dir(symbol);
        fs::remove_dir_all(&dir)
            .map_err(|e| DataError::CacheError(format!("remove {}: {e}", dir.display())))
    }
}

/// Cache status for a single symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
}

/// How well the cache covers the requested date range.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: NaiveDate,
        cached_end: NaiveDate,
    },
}

/// Total size of the files directly inside `path`.
pub fn dir_size(path: &Path) -> u64 {
    fs::read_dir(path)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|e| e.metadata().ok())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0)
}

fn hash_bars(bars: &[Bar]) -> Result<String, DataError> {
    let bytes = serde_json::to_vec(bars)
        .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn bars_to_dataframe(bars: &[&Bar]) -> Result<DataFrame, DataError> {
    let epoch = epoch();
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let adj_closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("adj_close".into(), adj_closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

/// Fill a uniquely named temp file in `dir`, then rename it over `path`.
/// Readers only ever see a complete file, whichever writer wins.
fn persist_atomically(
    dir: &Path,
    path: &Path,
    fill: impl FnOnce(&mut fs::File) -> Result<(), DataError>,
) -> Result<(), DataError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".write-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| DataError::CacheError(format!("temp file: {e}")))?;
    fill(tmp.as_file_mut())?;
    tmp.persist(path)
        .map_err(|e| DataError::CacheError(format!("atomic rename failed: {}", e.error)))?;
    Ok(())
}

fn write_parquet(df: &mut DataFrame, file: &mut fs::File) -> Result<(), DataError> {
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::ValidationError("empty parquet file".into()));
    }

    for col_name in ["date", "open", "high", "low", "close", "adj_close", "volume"] {
        if df.column(col_name).is_err() {
            return Err(DataError::ValidationError(format!(
                "missing column '{col_name}'"
            )));
        }
    }

    dataframe_to_bars(&df)
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<Bar>, DataError> {
    let column = |name: &str| {
        df.column(name)
            .map_err(|e| DataError::ParquetError(format!("column read: {e}")))
    };
    let type_err =
        |name: &str, e: PolarsError| DataError::ParquetError(format!("{name} column type: {e}"));

    let dates = column("date")?;
    let opens = column("open")?;
    let highs = column("high")?;
    let lows = column("low")?;
    let closes = column("close")?;
    let adj_closes = column("adj_close")?;
    let volumes = column("volume")?;

    let date_ca = dates.date().map_err(|e| type_err("date", e))?;
    let open_ca = opens.f64().map_err(|e| type_err("open", e))?;
    let high_ca = highs.f64().map_err(|e| type_err("high", e))?;
    let low_ca = lows.f64().map_err(|e| type_err("low", e))?;
    let close_ca = closes.f64().map_err(|e| type_err("close", e))?;
    let adj_ca = adj_closes.f64().map_err(|e| type_err("adj_close", e))?;
    let vol_ca = volumes.u64().map_err(|e| type_err("volume", e))?;

    let epoch = epoch();
    let n = df.height();
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let date_days = date_ca
            .get(i)
            .ok_or_else(|| DataError::ParquetError(format!("null date at row {i}")))?;

        bars.push(Bar {
            date: epoch + chrono::Duration::days(date_days as i64),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            adj_close: adj_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.get(i).unwrap_or(0),
        });
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_bars() -> Vec<Bar> {
        vec![
            Bar {
                date: d(2023, 12, 29),
                open: 99.0,
                high: 100.0,
                low: 98.0,
                close: 99.5,
                adj_close: 99.0,
                volume: 900,
            },
            Bar {
                date: d(2024, 1, 2),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                adj_close: 100.5,
                volume: 1000,
            },
            Bar {
                date: d(2024, 1, 3),
                open: 101.0,
                high: 103.0,
                low: 100.0,
                close: 102.0,
                adj_close: 101.5,
                volume: 1100,
            },
        ]
    }

    #[test]
    fn write_and_load_roundtrip_across_years() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();
        assert!(dir.path().join("symbol=AAPL/2023.parquet").exists());
        assert!(dir.path().join("symbol=AAPL/2024.parquet").exists());

        let loaded = cache.load("AAPL").unwrap();
        assert_eq!(loaded, sample_bars());
    }

    #[test]
    fn load_range_filters() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();

        let bars = cache.load_range("AAPL", d(2024, 1, 1), d(2024, 1, 2)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d(2024, 1, 2));
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        assert!(matches!(
            cache.load("NONEXISTENT"),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn writing_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        assert!(cache.write("AAPL", &[], DataSource::Synthetic).is_err());
    }

    #[test]
    fn corrupt_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();

        let bad = dir.path().join("symbol=AAPL/2023.parquet");
        fs::write(&bad, b"not parquet").unwrap();

        let loaded = cache.load("AAPL").unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!bad.exists());
        assert!(dir.path().join("symbol=AAPL/2023.parquet.quarantined").exists());
    }

    #[test]
    fn cache_meta_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        cache.write("AAPL", &sample_bars(), DataSource::AlphaVantage).unwrap();
        let meta = cache.get_meta("AAPL").unwrap();

        assert_eq!(meta.symbol, "AAPL");
        assert_eq!(meta.bar_count, 3);
        assert_eq!(meta.start_date, d(2023, 12, 29));
        assert_eq!(meta.source, "alpha_vantage");
        assert_eq!(meta.data_hash.len(), 64);
    }

    #[test]
    fn cache_status_query() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();
        let statuses = cache.status(&["AAPL", "MSFT"]);

        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].cached);
        assert_eq!(statuses[0].bar_count, Some(3));
        assert!(!statuses[1].cached);
    }

    #[test]
    fn coverage_check() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();

        assert_eq!(
            cache.covers_range("AAPL", d(2024, 1, 2), d(2024, 1, 3)),
            CoverageResult::FullyCovered
        );
        assert_eq!(
            cache.covers_range("AAPL", d(2023, 1, 1), d(2024, 1, 3)),
            CoverageResult::PartiallyCovered {
                cached_start: d(2023, 12, 29),
                cached_end: d(2024, 1, 3),
            }
        );
        assert_eq!(
            cache.covers_range("MSFT", NaiveDate::default(), NaiveDate::default()),
            CoverageResult::NotCached
        );
    }

    #[test]
    fn requested_range_covers_non_trading_edges() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        // 2023-12-30 is a Saturday, 2024-01-06 a Saturday too
        cache
            .write_range(
                "AAPL",
                &sample_bars(),
                DataSource::YahooFinance,
                d(2023, 12, 30),
                d(2024, 1, 6),
            )
            .unwrap();

        assert_eq!(
            cache.covers_range("AAPL", d(2023, 12, 30), d(2024, 1, 6)),
            CoverageResult::FullyCovered
        );
        // the bar dates themselves still count
        assert_eq!(
            cache.covers_range("AAPL", d(2023, 12, 29), d(2024, 1, 3)),
            CoverageResult::FullyCovered
        );
        assert_eq!(
            cache.covers_range("AAPL", d(2023, 12, 1), d(2024, 1, 6)),
            CoverageResult::PartiallyCovered {
                cached_start: d(2023, 12, 29),
                cached_end: d(2024, 1, 6),
            }
        );
    }

    #[test]
    fn requested_end_is_capped_at_write_day() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let today = chrono::Local::now().date_naive();
        let far = today + chrono::Duration::days(30);
        cache
            .write_range("AAPL", &sample_bars(), DataSource::YahooFinance, d(2023, 12, 29), far)
            .unwrap();

        let (_, end) = cache.get_meta("AAPL").unwrap().covered();
        assert_eq!(end, today);
        assert!(matches!(
            cache.covers_range("AAPL", d(2023, 12, 29), far),
            CoverageResult::PartiallyCovered { .. }
        ));
    }

    #[test]
    fn meta_without_requested_range_still_parses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();
        let meta_path = dir.path().join("symbol=AAPL/meta.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("requested_start");
        obj.remove("requested_end");
        fs::write(&meta_path, serde_json::to_string(&value).unwrap()).unwrap();

        let meta = cache.get_meta("AAPL").unwrap();
        assert_eq!(meta.requested_start, None);
        assert_eq!(meta.covered(), (d(2023, 12, 29), d(2024, 1, 3)));
    }

    #[test]
    fn concurrent_writers_of_one_ticker_never_tear_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let bars: Vec<Bar> = (0..366)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar {
                    date: d(2023, 7, 1) + chrono::Duration::days(i),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    adj_close: close,
                    volume: 1_000,
                }
            })
            .collect();

        for _ in 0..10 {
            std::thread::scope(|s| {
                for _ in 0..8 {
                    s.spawn(|| {
                        cache.write("^GSPC", &bars, DataSource::YahooFinance).unwrap();
                    });
                }
            });
            assert_eq!(cache.load("^GSPC").unwrap(), bars);
        }

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("symbol=^GSPC"))
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".quarantined") || n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        assert_eq!(cache.get_meta("^GSPC").unwrap().bar_count, 366);
    }

    #[test]
    fn entries_and_stale_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("AAPL", &sample_bars(), DataSource::YahooFinance).unwrap();
        cache.write("^GSPC", &sample_bars(), DataSource::YahooFinance).unwrap();
        fs::create_dir_all(dir.path().join("unrelated")).unwrap();

        let entries = cache.entries().unwrap();
        let symbols: Vec<_> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "^GSPC"]);
        assert!(entries.iter().all(|e| e.size_bytes > 0 && e.meta.is_some()));

        let future = chrono::Local::now().naive_local() + chrono::Duration::days(1);
        assert_eq!(cache.stale_entries(future).unwrap().len(), 2);
        let past = chrono::Local::now().naive_local() - chrono::Duration::days(1);
        assert!(cache.stale_entries(past).unwrap().is_empty());

        cache.remove("AAPL").unwrap();
        assert_eq!(cache.entries().unwrap().len(), 1);
    }

    #[test]
    fn missing_root_has_no_entries() {
        let cache = ParquetCache::new("/nonexistent/stoc-cache-root");
        assert!(cache.entries().unwrap().is_empty());
    }
}
