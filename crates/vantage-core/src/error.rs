//! Error types for client operations.
//!
//! This module defines [`VantageError`] which covers every failure that can
//! occur while building a request, calling the API, normalizing a payload or
//! exporting a table.

use thiserror::Error;

/// Guidance printed when no API key can be found.
pub const MISSING_API_KEY: &str = "\
The Alpha Vantage API key must be provided.

Get a free key from the Alpha Vantage website:
https://www.alphavantage.co/support/#api-key
Pass it with ClientConfig::new(\"...\")
OR
Set the environment variable AV_API_KEY to your key";

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum VantageError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a throttling note instead of data.
    #[error("Rate limited by {provider}: {message}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Note returned by the service.
        message: String,
    },

    /// The service returned an explicit error message.
    #[error("{function} failed upstream: {message}")]
    Upstream {
        /// Function that was requested.
        function: String,
        /// Error message returned by the service.
        message: String,
    },

    /// The expected data key is absent from the payload.
    #[error("Download of {function} failed: no {key} in payload. Check the documentation for correct parameters: https://www.alphavantage.co/documentation/")]
    MissingKey {
        /// Function that was requested.
        function: String,
        /// Key that was expected.
        key: String,
    },

    /// Error parsing data from the service.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No API key was supplied and none was found in the environment.
    #[error("{}", MISSING_API_KEY)]
    MissingApiKey,

    /// The endpoint catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Error writing an exported table.
    #[error("Export error: {0}")]
    Export(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl VantageError {
    /// Returns true for configuration and normalization failures.
    ///
    /// These are the failures the client terminates on when configured with
    /// `exit_on_fatal`.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey
                | Self::Catalog(_)
                | Self::MissingKey { .. }
                | Self::Upstream { .. }
                | Self::RateLimited { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for VantageError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type alias using [`VantageError`].
pub type Result<T> = std::result::Result<T, VantageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(VantageError::MissingApiKey.is_fatal());
        assert!(
            VantageError::MissingKey {
                function: "TIME_SERIES_DAILY".to_string(),
                key: "Time Series (Daily)".to_string(),
            }
            .is_fatal()
        );
        assert!(!VantageError::Network("timeout".to_string()).is_fatal());
        assert!(!VantageError::InvalidParameter("interval".to_string()).is_fatal());
    }

    #[test]
    fn test_missing_api_key_message_has_guidance() {
        let msg = VantageError::MissingApiKey.to_string();
        assert!(msg.contains("AV_API_KEY"));
        assert!(msg.contains("https://www.alphavantage.co/support/#api-key"));
    }
}
