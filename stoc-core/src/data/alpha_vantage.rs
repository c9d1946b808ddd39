//! Alpha Vantage data provider (`TIME_SERIES_DAILY_ADJUSTED`).
//!
//! Requires an API key. The service reports problems inside a 200 response:
//! `Error Message` for an unknown symbol, `Note` or `Information` when the
//! free-tier quota is exhausted.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use super::circuit_breaker::CircuitBreaker;
use super::http;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

pub const API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";
const BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyEntry>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. adjusted close")]
    adj_close: String,
    #[serde(rename = "6. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct Overview {
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
}

pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl AlphaVantageProvider {
    pub fn new(
        api_key: impl Into<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: http::client(Duration::from_secs(30))?,
            api_key: api_key.into(),
            circuit_breaker,
        })
    }

    /// Key from `ALPHAVANTAGE_API_KEY`.
    pub fn from_env(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DataError::MissingCredentials {
                var: API_KEY_VAR.to_string(),
            })?;
        Self::new(key, circuit_breaker)
    }

    fn get(&self, params: &[(&str, &str)]) -> Result<reqwest::blocking::Response, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }
        let resp = self
            .client
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .map_err(http::transport_error)?;
        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            self.circuit_breaker.trip();
            return Err(DataError::CircuitBreakerTripped);
        }
        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(DataError::Other(format!("HTTP {status} from Alpha Vantage")));
        }
        Ok(resp)
    }
}

fn parse_daily(
    symbol: &str,
    resp: DailyResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>, DataError> {
    if resp.error_message.is_some() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    if let Some(note) = resp.note.or(resp.information) {
        debug!(symbol, note, "alpha vantage throttled");
        return Err(DataError::RateLimited {
            retry_after_secs: 60,
        });
    }
    let series = resp
        .series
        .ok_or_else(|| DataError::ResponseFormatChanged("no daily time series".into()))?;

    let num = |field: &str, raw: &str| -> Result<f64, DataError> {
        raw.trim().parse::<f64>().map_err(|_| {
            DataError::ResponseFormatChanged(format!("{field} is not a number: {raw:?}"))
        })
    };

    let mut bars = Vec::new();
    // BTreeMap keys are ISO dates, so iteration is chronological.
    for (day, entry) in series {
        let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|_| DataError::ResponseFormatChanged(format!("invalid date: {day}")))?;
        if date < start || date > end {
            continue;
        }
        bars.push(Bar {
            date,
            open: num("open", &entry.open)?,
            high: num("high", &entry.high)?,
            low: num("low", &entry.low)?,
            close: num("close", &entry.close)?,
            adj_close: num("adjusted close", &entry.adj_close)?,
            volume: num("volume", &entry.volume)?.max(0.0) as u64,
        });
    }
    Ok(bars)
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let resp = self.get(&[
            ("function", "TIME_SERIES_DAILY_ADJUSTED"),
            ("symbol", symbol),
            ("outputsize", "full"),
        ])?;
        let body: DailyResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        let result = parse_daily(symbol, body, start, end);
        match &result {
            Ok(bars) => {
                self.circuit_breaker.record_success();
                info!(symbol, bars = bars.len(), %start, %end, "fetched from alpha vantage");
            }
            Err(DataError::RateLimited { .. }) => self.circuit_breaker.record_failure(),
            Err(_) => {}
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: result?,
            source: DataSource::AlphaVantage,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    fn market_cap(&self, symbol: &str) -> Option<f64> {
        let resp = self.get(&[("function", "OVERVIEW"), ("symbol", symbol)]).ok()?;
        let overview: Overview = resp.json().ok()?;
        overview
            .market_cap
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| *v > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const PAYLOAD: &str = r#"{
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": {
            "2024-01-04": {"1. open": "160.0", "2. high": "162.0", "3. low": "159.0",
                "4. close": "161.0", "5. adjusted close": "155.0", "6. volume": "4000",
                "7. dividend amount": "0.0000", "8. split coefficient": "1.0"},
            "2024-01-02": {"1. open": "158.0", "2. high": "160.0", "3. low": "157.5",
                "4. close": "159.0", "5. adjusted close": "153.1", "6. volume": "5000",
                "7. dividend amount": "0.0000", "8. split coefficient": "1.0"},
            "2023-12-29": {"1. open": "157.0", "2. high": "158.0", "3. low": "156.0",
                "4. close": "157.5", "5. adjusted close": "151.6", "6. volume": "3000",
                "7. dividend amount": "0.0000", "8. split coefficient": "1.0"}
        }
    }"#;

    #[test]
    fn parses_and_filters_to_range() {
        let resp: DailyResponse = serde_json::from_str(PAYLOAD).unwrap();
        let bars = parse_daily("IBM", resp, d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[1].adj_close, 155.0);
        assert_eq!(bars[1].volume, 4000);
    }

    #[test]
    fn error_message_is_symbol_not_found() {
        let resp: DailyResponse =
            serde_json::from_str(r#"{"Error Message": "Invalid API call."}"#).unwrap();
        let err = parse_daily("NOPE", resp, d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn note_is_rate_limit() {
        let resp: DailyResponse = serde_json::from_str(
            r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
        )
        .unwrap();
        let err = parse_daily("IBM", resp, d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, DataError::RateLimited { .. }));

        let resp: DailyResponse =
            serde_json::from_str(r#"{"Information": "premium endpoint"}"#).unwrap();
        assert!(parse_daily("IBM", resp, d(2024, 1, 1), d(2024, 2, 1)).is_err());
    }

    #[test]
    fn garbage_number_is_format_change() {
        let resp: DailyResponse = serde_json::from_str(
            r#"{"Time Series (Daily)": {"2024-01-02": {"1. open": "abc", "2. high": "1",
            "3. low": "1", "4. close": "1", "5. adjusted close": "1", "6. volume": "1"}}}"#,
        )
        .unwrap();
        let err = parse_daily("IBM", resp, d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn missing_key_is_reported() {
        // Only meaningful when the variable is not set in the test environment.
        if std::env::var(API_KEY_VAR).is_ok() {
            return;
        }
        let cb = Arc::new(CircuitBreaker::default_provider());
        let err = AlphaVantageProvider::from_env(cb).err().unwrap();
        assert!(matches!(err, DataError::MissingCredentials { ref var } if var == API_KEY_VAR));
    }
}
