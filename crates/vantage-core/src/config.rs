//! Client configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, VantageError};
use crate::frequency::OutputSize;
use crate::types::DataType;

/// Base URL of the Alpha Vantage REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "AV_API_KEY";

/// Default directory for exported tables.
pub const DEFAULT_EXPORT_PATH: &str = "~/av_data";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between consecutive calls on the free tier.
pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(15);

/// File format of exported tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated values.
    #[default]
    Csv,
    /// JSON records.
    Json,
    /// Apache Parquet, the binary table format.
    Parquet,
    /// HTML table.
    Html,
    /// Plain text rendering of the table.
    Txt,
}

impl OutputFormat {
    /// File extension for the format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Html => "html",
            Self::Txt => "txt",
        }
    }

    /// Parses a format leniently.
    ///
    /// `pkl` is accepted as an alias of parquet. Unknown formats, including
    /// `xlsx`, fall back to csv.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "csv" => Self::Csv,
            "json" => Self::Json,
            "parquet" | "pkl" => Self::Parquet,
            "html" => Self::Html,
            "txt" => Self::Txt,
            other => {
                if other == "xlsx" {
                    warn!("xlsx export is not available, writing csv instead");
                }
                Self::default()
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Configuration of an Alpha Vantage client.
///
/// Built with [`ClientConfig::new`] or [`ClientConfig::from_env`] and refined
/// with the `with_*` methods.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent with every call.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Premium keys are not throttled.
    pub premium: bool,
    /// Rows requested from series endpoints.
    pub output_size: OutputSize,
    /// Response format requested from the API.
    pub datatype: DataType,
    /// Simplify column names of normalized tables.
    pub clean: bool,
    /// Write every normalized table to `export_path`.
    pub export: bool,
    /// Directory exported tables are written to, with `~` expanded.
    pub export_path: PathBuf,
    /// File format of exported tables.
    pub output: OutputFormat,
    /// Proxy URLs keyed by scheme (`http`, `https` or `all`).
    pub proxy: BTreeMap<String, String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Delay before every call after the first one, unless premium.
    pub throttle: Duration,
    /// Endpoint URL.
    pub base_url: String,
    /// Terminate the process on fatal errors instead of returning them.
    pub exit_on_fatal: bool,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("premium", &self.premium)
            .field("output_size", &self.output_size)
            .field("datatype", &self.datatype)
            .field("clean", &self.clean)
            .field("export", &self.export)
            .field("export_path", &self.export_path)
            .field("output", &self.output)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .field("throttle", &self.throttle)
            .field("base_url", &self.base_url)
            .field("exit_on_fatal", &self.exit_on_fatal)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            premium: false,
            output_size: OutputSize::default(),
            datatype: DataType::default(),
            clean: false,
            export: false,
            export_path: expand_home(DEFAULT_EXPORT_PATH, home_dir().as_deref()),
            output: OutputFormat::default(),
            proxy: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            throttle: DEFAULT_THROTTLE,
            base_url: DEFAULT_BASE_URL.to_string(),
            exit_on_fatal: false,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given API key.
    ///
    /// An empty key falls back to the `AV_API_KEY` environment variable.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            dotenvy::dotenv().ok();
            return Self::from_lookup(|name| std::env::var(name).ok()).unwrap_or_default();
        }
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Loads the API key from the environment, reading `.env` first.
    ///
    /// # Errors
    /// Returns [`VantageError::MissingApiKey`] if `AV_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an environment lookup function.
    ///
    /// # Errors
    /// Returns [`VantageError::MissingApiKey`] if the lookup has no non-empty
    /// `AV_API_KEY`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or(VantageError::MissingApiKey)?;
        debug!(env = API_KEY_ENV, "Loaded API key from environment");
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }

    /// Ensures the configuration can be used for calls.
    ///
    /// # Errors
    /// Returns [`VantageError::MissingApiKey`] if no key is configured.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(VantageError::MissingApiKey);
        }
        Ok(())
    }

    /// Marks the key as premium, disabling the throttle.
    #[must_use]
    pub const fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    /// Sets the output size, leniently parsed.
    #[must_use]
    pub fn with_output_size(mut self, output_size: &str) -> Self {
        self.output_size = OutputSize::parse_or_default(output_size);
        self
    }

    /// Sets the response format, leniently parsed.
    #[must_use]
    pub fn with_datatype(mut self, datatype: &str) -> Self {
        self.datatype = DataType::parse_or_default(datatype);
        self
    }

    /// Enables simplified column names.
    #[must_use]
    pub const fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Enables export of every normalized table.
    #[must_use]
    pub const fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    /// Sets the export directory, expanding a leading `~`.
    #[must_use]
    pub fn with_export_path(mut self, path: impl AsRef<str>) -> Self {
        self.export_path = expand_home(path.as_ref(), home_dir().as_deref());
        self
    }

    /// Sets the export file format, leniently parsed.
    #[must_use]
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = OutputFormat::parse_or_default(output);
        self
    }

    /// Adds a proxy for a scheme (`http`, `https` or `all`).
    #[must_use]
    pub fn with_proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.proxy.insert(scheme.into(), url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the delay between consecutive free-tier calls.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Terminates the process on fatal errors.
    #[must_use]
    pub const fn with_exit_on_fatal(mut self, exit_on_fatal: bool) -> Self {
        self.exit_on_fatal = exit_on_fatal;
        self
    }
}

fn home_dir() -> Option<String> {
    std::env::var("HOME").ok().filter(|h| !h.is_empty())
}

/// Expands a leading `~` against `home`.
///
/// Paths without a leading `~`, or when no home is known, are returned as is.
#[must_use]
pub fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return PathBuf::from(home);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Path::new(home).join(rest),
        None => PathBuf::from(path),
    }
}
