//! Request parameters and option validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the parameter carrying the API key.
pub const API_KEY_PARAM: &str = "apikey";

/// Name of the parameter carrying the function.
pub const FUNCTION_PARAM: &str = "function";

/// A single query parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value, e.g. a period length or moving average type.
    Int(i64),
    /// Floating point value, e.g. a standard deviation multiplier.
    Float(f64),
    /// Any other value.
    Text(String),
}

impl ParamValue {
    /// Returns the value as a float if it is numeric or parses as a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the text of a [`ParamValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Keep a trailing ".0" on whole numbers, the service accepts both.
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Text(if v { "true" } else { "false" }.to_string())
    }
}

/// Caller supplied options, keyed by parameter name.
pub type Options = BTreeMap<String, ParamValue>;

/// Builds an [`Options`] map from `(name, value)` pairs.
pub fn options<K, V, I>(pairs: I) -> Options
where
    K: Into<String>,
    V: Into<ParamValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Ordered query parameters of one API call.
///
/// Insertion order is kept so the query string reads the way it was built.
/// Setting an existing name replaces its value in place. The `Debug` output
/// never shows the API key.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParameters {
    /// Creates parameters for a function.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        let mut params = Self::default();
        params.set(FUNCTION_PARAM, function.into());
        params
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`RequestParameters::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns a parameter rendered as text.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    /// Returns true if the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a parameter, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// The function being called.
    #[must_use]
    pub fn function(&self) -> &str {
        self.get(FUNCTION_PARAM)
            .and_then(ParamValue::as_text)
            .unwrap_or_default()
    }

    /// Iterates over parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the parameters as query pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy without the API key, suitable for logs and history.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.remove(API_KEY_PARAM);
        copy
    }
}

impl fmt::Debug for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.entries {
            if k == API_KEY_PARAM {
                map.entry(k, &"[REDACTED]");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

const PERIOD_OPTIONS: &[&str] = &[
    "time_period",
    "timeperiod1",
    "timeperiod2",
    "timeperiod3",
    "fastperiod",
    "slowperiod",
    "signalperiod",
    "fastkperiod",
    "fastdperiod",
    "slowkperiod",
    "slowdperiod",
];

const MAGNITUDE_OPTIONS: &[&str] = &["nbdevup", "nbdevdn", "acceleration", "maximum"];

const LIMIT_OPTIONS: &[&str] = &["fastlimit", "slowlimit"];

/// Validates and coerces an optional parameter.
///
/// Returns the value to send, or `None` when the option must be dropped:
///
/// - moving average types (`matype`, `fastmatype`, ...) are the integer part of
///   the absolute value and must be one of `matypes`
/// - period lengths are the integer part of the absolute value
/// - `nbdevup`, `nbdevdn`, `acceleration` and `maximum` are absolute floats
/// - `fastlimit` and `slowlimit` are absolute floats strictly between 0 and 1
/// - every other option passes through unchanged
#[must_use]
pub fn validate_option(matypes: &[u32], name: &str, value: &ParamValue) -> Option<ParamValue> {
    if name.ends_with("matype") {
        let code = value.as_f64()?.abs().trunc();
        return matypes
            .iter()
            .any(|&m| f64::from(m) == code)
            .then_some(ParamValue::Int(code as i64));
    }
    if PERIOD_OPTIONS.contains(&name) {
        return value
            .as_f64()
            .map(|v| ParamValue::Int(v.abs().trunc() as i64));
    }
    if MAGNITUDE_OPTIONS.contains(&name) {
        return value.as_f64().map(|v| ParamValue::Float(v.abs()));
    }
    if LIMIT_OPTIONS.contains(&name) {
        let limit = value.as_f64()?.abs();
        return (limit > 0.0 && limit < 1.0).then_some(ParamValue::Float(limit));
    }
    Some(value.clone())
}
