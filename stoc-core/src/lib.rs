//! STOC core: daily price bars, exchange tables, market data providers with a
//! Parquet cache, and the derived-metric math behind the stock dashboard.

pub mod data;
pub mod domain;
pub mod metrics;
