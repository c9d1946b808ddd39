//! Market data: providers, ingest, Parquet cache, batch download.

pub mod alpha_vantage;
pub mod cache;
pub mod circuit_breaker;
pub mod csv_source;
pub mod download;
mod http;
pub mod ingest;
pub mod provider;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use cache::{CacheEntry, CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use circuit_breaker::CircuitBreaker;
pub use csv_source::{CsvDatasetProvider, CsvLocation};
pub use download::{download_single, download_symbols, DownloadSummary};
pub use ingest::{ingest, IngestResult};
pub use provider::{DataError, DataProvider, DataSource, DownloadProgress, FetchResult, LogProgress};
pub use yahoo::YahooProvider;
