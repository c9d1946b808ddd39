//! Per-ticker CSV datasets in the Yahoo download layout.
//!
//! Files are named `{SYMBOL}.csv` with the header
//! `Date,Open,High,Low,Close,Adj Close,Volume`. They are read either from a
//! local directory or from a remote raw-file host (`{base_url}/{SYMBOL}.csv`).
//! Fields may be empty or `null`; those become NaN.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::info;

use super::http;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

/// Where the dataset files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvLocation {
    Dir(PathBuf),
    Remote(String),
}

pub struct CsvDatasetProvider {
    location: CsvLocation,
    client: Option<reqwest::blocking::Client>,
}

impl CsvDatasetProvider {
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: CsvLocation::Dir(dir.into()),
            client: None,
        }
    }

    pub fn remote(base_url: impl Into<String>) -> Result<Self, DataError> {
        let base = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            location: CsvLocation::Remote(base),
            client: Some(http::client(Duration::from_secs(30))?),
        })
    }

    pub fn location(&self) -> &CsvLocation {
        &self.location
    }

    fn file_name(symbol: &str) -> String {
        format!("{symbol}.csv")
    }

    fn read_text(&self, symbol: &str) -> Result<String, DataError> {
        let not_found = || DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        };
        match (&self.location, &self.client) {
            (CsvLocation::Dir(dir), _) => {
                let path = dir.join(Self::file_name(symbol));
                let mut file = std::fs::File::open(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => not_found(),
                    _ => DataError::Other(format!("{}: {e}", path.display())),
                })?;
                let mut text = String::new();
                file.read_to_string(&mut text)
                    .map_err(|e| DataError::Other(format!("{}: {e}", path.display())))?;
                Ok(text)
            }
            (CsvLocation::Remote(base), Some(client)) => {
                let url = format!("{base}/{}", Self::file_name(symbol));
                let resp = client.get(&url).send().map_err(http::transport_error)?;
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(not_found());
                }
                if !status.is_success() {
                    return Err(DataError::Other(format!("HTTP {status} for {url}")));
                }
                resp.text().map_err(http::transport_error)
            }
            (CsvLocation::Remote(_), None) => {
                Err(DataError::Other("remote CSV provider has no HTTP client".into()))
            }
        }
    }
}

impl DataProvider for CsvDatasetProvider {
    fn name(&self) -> &str {
        "csv_dataset"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let text = self.read_text(symbol)?;
        let bars: Vec<Bar> = parse_csv(text.as_bytes())?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        info!(symbol, bars = bars.len(), "loaded csv dataset");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvDataset,
        })
    }

    fn is_available(&self) -> bool {
        match &self.location {
            CsvLocation::Dir(dir) => dir.is_dir(),
            CsvLocation::Remote(_) => self.client.is_some(),
        }
    }
}

/// Parse a Yahoo-layout CSV. Columns are located by header name.
pub fn parse_csv(reader: impl Read) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::MalformedCsv {
            line: 1,
            message: e.to_string(),
        })?
        .clone();
    let find = |name: &str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::MalformedCsv {
                line: 1,
                message: format!("missing column '{name}'"),
            })
    };
    let date_i = find("Date")?;
    let open_i = find("Open")?;
    let high_i = find("High")?;
    let low_i = find("Low")?;
    let close_i = find("Close")?;
    let volume_i = find("Volume")?;
    let adj_i = find("Adj Close").ok();

    let mut bars = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DataError::MalformedCsv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |message: String| DataError::MalformedCsv { line, message };

        let raw_date = record.get(date_i).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| malformed(format!("invalid date {raw_date:?}")))?;

        let field = |i: usize| -> Result<f64, DataError> {
            let raw = record.get(i).unwrap_or("");
            if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
                return Ok(f64::NAN);
            }
            raw.parse::<f64>()
                .map_err(|_| malformed(format!("invalid number {raw:?}")))
        };

        let close = field(close_i)?;
        let volume = field(volume_i)?;
        bars.push(Bar {
            date,
            open: field(open_i)?,
            high: field(high_i)?,
            low: field(low_i)?,
            close,
            adj_close: match adj_i {
                Some(i) => field(i)?,
                None => close,
            },
            volume: if volume.is_nan() { 0 } else { volume.max(0.0) as u64 },
        });
    }
    Ok(bars)
}

/// ISO dates, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
