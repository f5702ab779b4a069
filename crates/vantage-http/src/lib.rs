#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! HTTP transport for the Alpha Vantage REST endpoint.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vantage_core::{ApiTransport, ClientConfig, DataType, RequestParameters};
//! use vantage_http::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let transport = HttpTransport::new(&config)?;
//!
//!     let params = RequestParameters::new("GLOBAL_QUOTE")
//!         .with("symbol", "IBM")
//!         .with("apikey", config.api_key.as_str());
//!     let raw = transport.fetch(&params, DataType::Json).await?;
//!
//!     Ok(())
//! }
//! ```

mod throttle;

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use vantage_core::{
    ApiTransport, ClientConfig, DataType, RawResponse, RequestParameters, Result, VantageError,
    config::{DEFAULT_BASE_URL, DEFAULT_THROTTLE, DEFAULT_TIMEOUT},
    types::snippet,
};

use crate::throttle::Throttle;

const PROVIDER: &str = "AlphaVantage";

/// `reqwest` based transport with a fixed-delay throttle.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    throttle: Arc<Mutex<Throttle>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(client, DEFAULT_THROTTLE, false)
    }
}

impl HttpTransport {
    /// Creates a transport from the client configuration.
    ///
    /// Uses the configured timeout, proxies, throttle delay and base URL.
    ///
    /// # Errors
    /// Returns [`VantageError::InvalidParameter`] for an unparseable proxy URL
    /// and [`VantageError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        for (scheme, url) in &config.proxy {
            let proxy = match scheme.to_lowercase().as_str() {
                "http" => Proxy::http(url),
                "https" => Proxy::https(url),
                "all" => Proxy::all(url),
                other => {
                    warn!(scheme = %other, "Ignoring proxy for unknown scheme");
                    continue;
                }
            }
            .map_err(|e| VantageError::InvalidParameter(format!("proxy {scheme}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| VantageError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config.throttle, config.premium).with_base_url(&config.base_url))
    }

    /// Creates a transport with a pre-configured HTTP client.
    #[must_use]
    pub fn with_client(client: Client, delay: Duration, premium: bool) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: Arc::new(Mutex::new(Throttle::new(delay, premium))),
        }
    }

    /// Points the transport at another endpoint, e.g. a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of calls made so far.
    pub async fn calls(&self) -> u64 {
        self.throttle.lock().await.calls()
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self, params: &RequestParameters, datatype: DataType) -> Result<RawResponse> {
        self.throttle.lock().await.wait().await;

        let function = params.function().to_string();
        debug!(provider = PROVIDER, function = %function, params = ?params, "Sending request");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params.to_query())
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, function = %function, params = ?params, error = %e, "Request failed");
                VantageError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VantageError::Network(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!(
                provider = PROVIDER,
                function = %function,
                status = %status,
                body = %snippet(&body),
                "Request failed, decoding body anyway"
            );
        }

        RawResponse::from_body(datatype, body)
    }
}
