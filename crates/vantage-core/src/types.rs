//! Core data types.
//!
//! - [`Symbol`] - Uppercased ticker, currency or coin code
//! - [`RawResponse`] - Undecoded payload returned by a transport
//! - [`DataType`] - Response format requested from the API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VantageError};

/// A trading symbol, currency code or coin code.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Response format of an API call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// JSON document.
    #[default]
    Json,
    /// Comma separated text.
    Csv,
}

impl DataType {
    /// Wire value of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Parses a format leniently, falling back to [`DataType::Json`].
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "csv" => Self::Csv,
            _ => Self::Json,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload of a single API call, tagged by its format.
#[derive(Clone, Debug, PartialEq)]
pub enum RawResponse {
    /// Parsed JSON document.
    Json(serde_json::Value),
    /// Delimited text.
    Text(String),
}

impl RawResponse {
    /// Decodes a response body according to the requested format.
    ///
    /// # Errors
    /// Returns [`VantageError::Parse`] if a JSON body is not valid JSON.
    pub fn from_body(datatype: DataType, body: String) -> Result<Self> {
        match datatype {
            DataType::Json => serde_json::from_str(&body)
                .map(Self::Json)
                .map_err(|e| VantageError::Parse(format!("{e}: {}", snippet(&body)))),
            DataType::Csv => Ok(Self::Text(body.replace('\r', ""))),
        }
    }

    /// Returns the response format.
    #[must_use]
    pub const fn datatype(&self) -> DataType {
        match self {
            Self::Json(_) => DataType::Json,
            Self::Text(_) => DataType::Csv,
        }
    }
}

/// Truncates a body for diagnostics.
#[must_use]
pub fn snippet(body: &str) -> String {
    const MAX: usize = 500;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...[truncated]", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercases() {
        assert_eq!(Symbol::new("msft").as_str(), "MSFT");
        assert_eq!(Symbol::from(" btc ").to_string(), "BTC");
    }

    #[test]
    fn test_datatype_lenient_parse() {
        assert_eq!(DataType::parse_or_default("CSV"), DataType::Csv);
        assert_eq!(DataType::parse_or_default("other"), DataType::Json);
    }

    #[test]
    fn test_from_body_strips_carriage_returns() {
        let raw = RawResponse::from_body(DataType::Csv, "a,b\r\n1,2\r\n".to_string()).unwrap();
        assert_eq!(raw, RawResponse::Text("a,b\n1,2\n".to_string()));
    }

    #[test]
    fn test_from_body_rejects_invalid_json() {
        let err = RawResponse::from_body(DataType::Json, "{not json".to_string()).unwrap_err();
        assert!(matches!(err, VantageError::Parse(_)));
    }
}
