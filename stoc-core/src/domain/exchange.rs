//! Exchange lookup tables: exchange name → ticker suffix and benchmark index.
//!
//! Yahoo-style tickers carry an exchange suffix (`RELIANCE.NS`, `VOD.L`). The
//! dashboard asks the user for a bare symbol plus an exchange name and resolves
//! the provider ticker from this table. Each exchange also names the index used
//! as its "national average" when scoring.

use serde::Serialize;
use thiserror::Error;

/// Ticker of the volatility index fetched alongside every report.
pub const VOLATILITY_INDEX: &str = "^VIX";

/// Benchmark used when an exchange has no usable index of its own.
pub const DEFAULT_BENCHMARK: &str = "^GSPC";

/// One row of the exchange table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub name: &'static str,
    pub suffix: &'static str,
    pub benchmark: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("unknown exchange '{0}' (run `stoc exchanges` for the list)")]
    Unknown(String),
}

#[rustfmt::skip]
static EXCHANGES: &[Exchange] = &[
    Exchange { name: "NYSE", suffix: "", benchmark: "^GSPC" },
    Exchange { name: "NASDAQ", suffix: "", benchmark: "^IXIC" },
    Exchange { name: "BSE", suffix: "", benchmark: "^BSESN" },
    Exchange { name: "NSE", suffix: ".NS", benchmark: "^NSEI" },
    Exchange { name: "Cboe Indices", suffix: ".CI", benchmark: "^VIX" },
    Exchange { name: "Chicago Board of Trade (CBOT)***", suffix: ".CBT", benchmark: "^VIX" },
    Exchange { name: "Chicago Mercantile Exchange (CME)***", suffix: ".CME", benchmark: "CME" },
    Exchange { name: "Dow Jones Indexes", suffix: ".DJ", benchmark: "^DJI" },
    Exchange { name: "Nasdaq Stock Exchange", suffix: ".NSQ", benchmark: "^IXIC" },
    Exchange { name: "ICE Futures US", suffix: ".NYB", benchmark: "^RUT" },
    Exchange { name: "New York Commodities Exchange (COMEX)***", suffix: ".CMX", benchmark: "GC=F" },
    Exchange { name: "New York Mercantile Exchange (NYMEX)***", suffix: ".NYM", benchmark: "CL=F" },
    Exchange { name: "Options Price Reporting Authority (OPRA)", suffix: ".OPR", benchmark: "OPRA" },
    Exchange { name: "OTC Markets Group**", suffix: ".OTC", benchmark: "OTCM" },
    Exchange { name: "S & P Indices", suffix: ".SP", benchmark: "^GSPC" },
    Exchange { name: "Buenos Aires Stock Exchange (BYMA)", suffix: ".BA", benchmark: "^MERV" },
    Exchange { name: "Vienna Stock Exchange", suffix: ".VI", benchmark: "^ATX" },
    Exchange { name: "Australian Stock Exchange (ASX)", suffix: ".AX", benchmark: "^AXJO" },
    Exchange { name: "Cboe Australia", suffix: ".CBA", benchmark: "^XVI" },
    Exchange { name: "Euronext Brussels", suffix: ".BR", benchmark: "^BFX" },
    Exchange { name: "Sao Paolo Stock Exchange (BOVESPA)", suffix: ".SA", benchmark: "^BVSP" },
    Exchange { name: "Canadian Securities Exchange", suffix: ".CN", benchmark: "^GSPTSE" },
    Exchange { name: "Cboe Canada", suffix: ".CBOE", benchmark: "^VIXC" },
    Exchange { name: "Toronto Stock Exchange (TSX)", suffix: ".TO", benchmark: "^GSPTSE" },
    Exchange { name: "TSX Venture Exchange (TSXV)", suffix: ".TV", benchmark: "^JX" },
    Exchange { name: "Santiago Stock Exchange", suffix: ".SN", benchmark: "^IPSA" },
    Exchange { name: "Shanghai Stock Exchange", suffix: ".SS", benchmark: "000001.SS" },
    Exchange { name: "Shenzhen Stock Exchange", suffix: ".SZ", benchmark: "399001.SZ" },
    Exchange { name: "Prague Stock Exchange Index", suffix: ".PR", benchmark: "^PX" },
    Exchange { name: "Nasdaq OMX Copenhagen", suffix: ".CO", benchmark: "^OMXC25" },
    Exchange { name: "Egyptian Exchange Index (EGID)", suffix: ".CA", benchmark: "^EGX30.CA" },
    Exchange { name: "Nasdaq OMX Tallinn", suffix: ".TL", benchmark: "^OMXTGI" },
    Exchange { name: "Cboe Europe", suffix: ".CE", benchmark: "^STOXX50E" },
    Exchange { name: "Euronext", suffix: ".EU", benchmark: "^N100" },
    Exchange { name: "Nasdaq OMX Helsinki", suffix: ".HE", benchmark: "^OMXH25" },
    Exchange { name: "Euronext Paris", suffix: ".PA", benchmark: "^FCHI" },
    Exchange { name: "Berlin Stock Exchange", suffix: ".BE", benchmark: "^GDAXI" },
    Exchange { name: "Bremen Stock Exchange", suffix: ".BM", benchmark: "BREXIT" },
    Exchange { name: "Dusseldorf Stock Exchange", suffix: ".DU", benchmark: "^GDAXI" },
    Exchange { name: "Frankfurt Stock Exchange", suffix: ".F", benchmark: "^GDAXI" },
    Exchange { name: "Hamburg Stock Exchange", suffix: ".HM", benchmark: "BREXIT" },
    Exchange { name: "Hanover Stock Exchange", suffix: ".HA", benchmark: "BREXIT" },
    Exchange { name: "Munich Stock Exchange", suffix: ".MU", benchmark: "^GDAXI" },
    Exchange { name: "Stuttgart Stock Exchange", suffix: ".SG", benchmark: "BREXIT" },
    Exchange { name: "Deutsche Boerse XETRA", suffix: ".DE", benchmark: "^GDAXI" },
    Exchange { name: "Collectable Indices", suffix: ".REGA", benchmark: "COLLECT" },
    Exchange { name: "Cryptocurrencies", suffix: "", benchmark: "CRYPTO" },
    Exchange { name: "Currency Rates", suffix: ".X", benchmark: "CURRENCY" },
    Exchange { name: "MSCI Indices", suffix: ".MSCI", benchmark: "MSCI" },
    Exchange { name: "Athens Stock Exchange (ATHEX)", suffix: ".AT", benchmark: "^ATG" },
    Exchange { name: "Hang Seng Indices", suffix: ".HSI", benchmark: "^HSI" },
    Exchange { name: "Hong Kong Stock Exchange (HKEX)*", suffix: ".HK", benchmark: "^HSI" },
    Exchange { name: "Budapest Stock Exchange", suffix: ".BD", benchmark: "^BUX" },
    Exchange { name: "Nasdaq OMX Iceland", suffix: ".IC", benchmark: "^OMXICELAND" },
    Exchange { name: "Bombay Stock Exchange", suffix: ".BO", benchmark: "^BSESN" },
    Exchange { name: "National Stock Exchange of India", suffix: ".NS", benchmark: "^NSEI" },
    Exchange { name: "Indonesia Stock Exchange (IDX)", suffix: ".JK", benchmark: "^JKSE" },
    Exchange { name: "Euronext Dublin", suffix: ".ID", benchmark: "^ISEQ" },
    Exchange { name: "Tel Aviv Stock Exchange", suffix: ".TA", benchmark: "^TA125.TA" },
    Exchange { name: "EuroTLX", suffix: ".TLX", benchmark: "^TLX" },
    Exchange { name: "Italian Stock Exchange", suffix: ".MI", benchmark: "FTSEMIB.MI" },
    Exchange { name: "Nikkei Indices", suffix: ".NIKKEI", benchmark: "^N225" },
    Exchange { name: "Tokyo Stock Exchange", suffix: ".T", benchmark: "^TPX" },
    Exchange { name: "Boursa Kuwait", suffix: ".KW", benchmark: "^KWSE" },
    Exchange { name: "Nasdaq OMX Riga", suffix: ".RG", benchmark: "^OMXRGI" },
    Exchange { name: "Nasdaq OMX Vilnius", suffix: ".VL", benchmark: "^OMXVGI" },
    Exchange { name: "Malaysian Stock Exchange", suffix: ".KL", benchmark: "^KLSE" },
    Exchange { name: "Mexico Stock Exchange (BMV)", suffix: ".MX", benchmark: "^MXX" },
    Exchange { name: "Euronext Amsterdam", suffix: ".AS", benchmark: "^AEX" },
    Exchange { name: "New Zealand Stock Exchange (NZX)", suffix: ".NZ", benchmark: "^NZ50" },
    Exchange { name: "Oslo Stock Exchange", suffix: ".OL", benchmark: "^OSEAX" },
    Exchange { name: "Philippine Stock Exchange Indices", suffix: ".PS", benchmark: "^PSEi" },
    Exchange { name: "Warsaw Stock Exchange", suffix: ".WA", benchmark: "^WIG" },
    Exchange { name: "Euronext Lisbon", suffix: ".LS", benchmark: "^PSI20" },
    Exchange { name: "Qatar Stock Exchange", suffix: ".QA", benchmark: "^QSI" },
    Exchange { name: "Bucharest Stock Exchange", suffix: ".RO", benchmark: "^BET" },
    Exchange { name: "Singapore Stock Exchange (SGX)", suffix: ".SI", benchmark: "^STI" },
    Exchange { name: "Johannesburg Stock Exchange", suffix: ".JO", benchmark: "^J203.JO" },
    Exchange { name: "Korea Stock Exchange", suffix: ".KS", benchmark: "^KS11" },
    Exchange { name: "KOSDAQ", suffix: ".KQ", benchmark: "^KQ11" },
    Exchange { name: "Madrid SE C.A.T.S.", suffix: ".MC", benchmark: "^IBEX" },
    Exchange { name: "Saudi Stock Exchange (Tadawul)", suffix: ".SAU", benchmark: "^TASI.SR" },
    Exchange { name: "Nasdaq OMX Stockholm", suffix: ".ST", benchmark: "^OMX" },
    Exchange { name: "Swiss Exchange (SIX)", suffix: ".SW", benchmark: "^SSMI" },
    Exchange { name: "Taiwan OTC Exchange", suffix: ".TWO", benchmark: "^TWO" },
    Exchange { name: "Taiwan Stock Exchange (TWSE)", suffix: ".TW", benchmark: "^TWII" },
    Exchange { name: "Stock Exchange of Thailand (SET)", suffix: ".BK", benchmark: "^SET.BK" },
    Exchange { name: "Borsa İstanbul", suffix: ".IS", benchmark: "^XU100" },
    Exchange { name: "Dubai Financial Market", suffix: ".AE", benchmark: "^DFMGI" },
    Exchange { name: "Cboe UK", suffix: ".CUK", benchmark: "^UKX" },
    Exchange { name: "FTSE Indices", suffix: ".FTSE", benchmark: "^FTSE" },
    Exchange { name: "London Stock Exchange", suffix: ".L", benchmark: "^FTSE" },
    Exchange { name: "Caracas Stock Exchange", suffix: ".CR", benchmark: "^IBC" },
];

impl Exchange {
    /// The full table in display order.
    pub fn all() -> &'static [Exchange] {
        EXCHANGES
    }

    /// Case-insensitive exact match on the exchange name.
    pub fn find(name: &str) -> Result<&'static Exchange, ExchangeError> {
        let wanted = name.trim().to_lowercase();
        EXCHANGES
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .ok_or_else(|| ExchangeError::Unknown(name.trim().to_string()))
    }

    /// Case-insensitive substring filter, used by the exchange picker.
    pub fn search(fragment: &str) -> Vec<&'static Exchange> {
        let needle = fragment.trim().to_lowercase();
        EXCHANGES
            .iter()
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Position of this exchange in [`Exchange::all`].
    pub fn index(&self) -> usize {
        EXCHANGES
            .iter()
            .position(|e| e.name == self.name)
            .unwrap_or(0)
    }

    /// Provider ticker for a bare symbol: upper-cased symbol plus suffix.
    pub fn ticker(&self, symbol: &str) -> String {
        format!("{}{}", symbol.trim().to_uppercase(), self.suffix)
    }

    /// Benchmark index for scoring. Placeholder entries in the table (tickers
    /// without a caret or exchange suffix, e.g. "CRYPTO") fall back to the S&P 500.
    pub fn benchmark(&self) -> &'static str {
        let b = self.benchmark;
        if b.starts_with('^') || b.contains('.') || b.contains('=') {
            b
        } else {
            DEFAULT_BENCHMARK
        }
    }
}

/// Market capitalisation size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketCapClass {
    Mega,
    Large,
    Mid,
    Small,
    Micro,
    Nano,
}

impl MarketCapClass {
    /// Lower bounds in dollars, largest first.
    const THRESHOLDS: [(MarketCapClass, f64); 6] = [
        (MarketCapClass::Mega, 200e9),
        (MarketCapClass::Large, 10e9),
        (MarketCapClass::Mid, 2e9),
        (MarketCapClass::Small, 500e6),
        (MarketCapClass::Micro, 50e6),
        (MarketCapClass::Nano, 0.0),
    ];

    pub fn classify(market_cap: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(_, floor)| market_cap >= *floor)
            .map(|(class, _)| *class)
            .unwrap_or(MarketCapClass::Nano)
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketCapClass::Mega => "Mega-cap",
            MarketCapClass::Large => "Large-cap",
            MarketCapClass::Mid => "Mid-cap",
            MarketCapClass::Small => "Small-cap",
            MarketCapClass::Micro => "Micro-cap",
            MarketCapClass::Nano => "Nano-cap",
        }
    }
}
