// =================================================================
// provider/errors.rs - Error Types
// =================================================================

use thiserror::Error;

/// Error types for price provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No price data available for {0}")]
    DataUnavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Provider API error: {0}")]
    ApiError(String),
}

impl ProviderError {
    /// Transient failures worth retrying by the caller
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::NetworkError(_) | ProviderError::Timeout)
    }
}

// Convert from common error types
impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for ProviderError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ProviderError::Io(err.to_string())
        } else {
            ProviderError::ParseError(err.to_string())
        }
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io(err.to_string())
    }
}

impl From<dca_common::DcaError> for ProviderError {
    fn from(err: dca_common::DcaError) -> Self {
        ProviderError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else {
            ProviderError::ApiError(err.to_string())
        }
    }
}
