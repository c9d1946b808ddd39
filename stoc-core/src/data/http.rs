//! Shared blocking HTTP client construction.

use std::time::Duration;

use super::provider::DataError;

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Blocking client with the given timeout and a browser user agent.
pub(crate) fn client(timeout: Duration) -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error to a data error.
pub(crate) fn transport_error(e: reqwest::Error) -> DataError {
    DataError::NetworkUnreachable(e.to_string())
}
