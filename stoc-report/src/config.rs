//! `stoc.toml`: file-backed settings with defaults for every field.
//!
//! ```toml
//! cache_dir = "data"
//! provider = "yahoo"          # yahoo | alpha_vantage | csv
//! default_exchange = "NYSE"
//!
//! [csv]
//! dir = "datasets"            # or: base_url = "https://raw.githubusercontent.com/<user>/<repo>/main"
//!
//! [metrics]
//! volatility_window = 20
//! trading_days = 252
//! annualize = true
//! extended = false
//!
//! [weights]
//! return = 0.3
//! volatility = 0.2
//! market_cap = 0.3
//! benchmark = 0.2
//!
//! [notify]
//! recipient = "me@example.com"
//! sender = "stoc@example.com"
//! ```
//!
//! Credentials are never read from this file; see `ALPHAVANTAGE_API_KEY`,
//! `STOC_MAIL_ENDPOINT` and `STOC_MAIL_TOKEN`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stoc_core::data::{
    AlphaVantageProvider, CircuitBreaker, CsvDatasetProvider, DataError, DataProvider,
    YahooProvider,
};
use stoc_core::domain::{Exchange, ExchangeError};
use stoc_core::metrics::MetricsConfig;
use thiserror::Error;
use tracing::debug;

use crate::scoring::ScoreWeights;

pub const DEFAULT_CONFIG_FILE: &str = "stoc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Which market-data source serves network fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    AlphaVantage,
    Csv,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Yahoo => "yahoo",
            ProviderKind::AlphaVantage => "alpha_vantage",
            ProviderKind::Csv => "csv",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "yahoo" | "yahoo_finance" => Ok(ProviderKind::Yahoo),
            "alpha_vantage" | "alphavantage" => Ok(ProviderKind::AlphaVantage),
            "csv" => Ok(ProviderKind::Csv),
            other => Err(ConfigError::Invalid(format!(
                "unknown provider '{other}' (expected yahoo, alpha_vantage or csv)"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Local directory holding `{SYMBOL}.csv` files.
    pub dir: Option<PathBuf>,
    /// Raw-file host base URL; used when `dir` is unset.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub recipient: Option<String>,
    pub sender: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            sender: "stoc@localhost".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StocConfig {
    pub cache_dir: PathBuf,
    pub provider: ProviderKind,
    pub default_exchange: String,
    pub csv: CsvConfig,
    pub metrics: MetricsConfig,
    pub weights: ScoreWeights,
    pub notify: NotifyConfig,
}

impl Default for StocConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data"),
            provider: ProviderKind::default(),
            default_exchange: "NYSE".into(),
            csv: CsvConfig::default(),
            metrics: MetricsConfig::default(),
            weights: ScoreWeights::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl StocConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: StocConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file. A missing file is an error here;
    /// see [`StocConfig::load_or_default`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Defaults when `path` does not exist; errors only for unreadable or malformed files.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.volatility_window < 2 {
            return Err(ConfigError::Invalid(
                "metrics.volatility_window must be at least 2".into(),
            ));
        }
        if self.metrics.trading_days == 0 {
            return Err(ConfigError::Invalid("metrics.trading_days must be positive".into()));
        }
        if !self.weights.all_finite() {
            return Err(ConfigError::Invalid("score weights must be finite numbers".into()));
        }
        if self.provider == ProviderKind::Csv && self.csv.dir.is_none() && self.csv.base_url.is_none()
        {
            return Err(ConfigError::Invalid(
                "provider = \"csv\" needs csv.dir or csv.base_url".into(),
            ));
        }
        self.exchange()?;
        Ok(())
    }

    pub fn exchange(&self) -> Result<&'static Exchange, ExchangeError> {
        Exchange::find(&self.default_exchange)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Build the configured provider around a shared circuit breaker.
    pub fn build_provider(
        &self,
        kind: ProviderKind,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Box<dyn DataProvider>, DataError> {
        Ok(match kind {
            ProviderKind::Yahoo => Box::new(YahooProvider::new(breaker)?),
            ProviderKind::AlphaVantage => Box::new(AlphaVantageProvider::from_env(breaker)?),
            ProviderKind::Csv => match (&self.csv.dir, &self.csv.base_url) {
                (Some(dir), _) => Box::new(CsvDatasetProvider::local(dir)),
                (None, Some(url)) => Box::new(CsvDatasetProvider::remote(url)?),
                (None, None) => {
                    return Err(DataError::Other(
                        "csv provider needs csv.dir or csv.base_url".into(),
                    ))
                }
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<StocConfig, ConfigError> {
        StocConfig::from_toml(s, Path::new("stoc.toml"))
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse("").unwrap(), StocConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
provider = "alpha_vantage"
default_exchange = "nse"

[metrics]
extended = true

[weights]
return = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::AlphaVantage);
        assert_eq!(config.exchange().unwrap().suffix, ".NS");
        assert!(config.metrics.extended);
        assert_eq!(config.metrics.volatility_window, 20);
        assert_eq!(config.weights.ret, 0.5);
        assert_eq!(config.weights.volatility, 0.2);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = parse("provider = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_exchange_rejected() {
        let err = parse("default_exchange = \"Atlantis\"").unwrap_err();
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn csv_provider_needs_location() {
        assert!(parse("provider = \"csv\"").is_err());
        assert!(parse("provider = \"csv\"\n[csv]\ndir = \"datasets\"").is_ok());
    }

    #[test]
    fn tiny_volatility_window_rejected() {
        assert!(parse("[metrics]\nvolatility_window = 1").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StocConfig::load_or_default(&dir.path().join("stoc.toml")).unwrap();
        assert_eq!(config, StocConfig::default());
        assert!(StocConfig::load(&dir.path().join("stoc.toml")).is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = StocConfig::default();
        config.notify.recipient = Some("me@example.com".into());
        let text = config.to_toml().unwrap();
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn provider_kind_parsing() {
        assert_eq!("Yahoo".parse::<ProviderKind>().unwrap(), ProviderKind::Yahoo);
        assert_eq!("alpha-vantage".parse::<ProviderKind>().unwrap(), ProviderKind::AlphaVantage);
        assert!("bloomberg".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn csv_provider_builds_from_dir() {
        let config = parse("provider = \"csv\"\n[csv]\ndir = \"datasets\"").unwrap();
        let provider = config
            .build_provider(ProviderKind::Csv, Arc::new(CircuitBreaker::default_provider()))
            .unwrap();
        assert_eq!(provider.name(), "csv_dataset");
    }
}
