//! Domain types: bars, the decorated price frame, exchange tables.

pub mod bar;
pub mod exchange;
pub mod frame;

pub use bar::Bar;
pub use exchange::{Exchange, ExchangeError, MarketCapClass, DEFAULT_BENCHMARK, VOLATILITY_INDEX};
pub use frame::{DerivedSeries, PriceFrame, BASE_COLUMNS};
