//! The Alpha Vantage client and its call flow.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, warn};

use vantage_core::{
    ApiTransport, Catalog, ClientConfig, DataType, Dataset, ReportFrequency, RequestParameters,
    Result, TableSink, VantageError,
    params::API_KEY_PARAM,
};
use vantage_export::{ExportRequest, FileSink, NoopSink, export_stem};
use vantage_table::{CalendarOrder, ShapeContext, normalize};

use crate::history::CallLog;

/// Async client for the Alpha Vantage REST API.
///
/// Every endpoint method sends exactly one request, normalizes the response
/// into a [`Dataset`] and, with `export` enabled, writes it to the sink.
/// Export failures are logged as warnings; the table is still returned.
///
/// # Example
///
/// ```rust,ignore
/// use vantage::{AlphaVantage, ClientConfig};
///
/// let av = AlphaVantage::new(ClientConfig::from_env()?)?;
/// let quote = av.quote("ibm").await?;
/// ```
pub struct AlphaVantage {
    config: ClientConfig,
    catalog: Arc<Catalog>,
    transport: Arc<dyn ApiTransport>,
    sink: Arc<dyn TableSink>,
    log: CallLog,
}

impl std::fmt::Debug for AlphaVantage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantage")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .field("sink", &self.sink)
            .field("calls", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl AlphaVantage {
    /// Creates a client that talks to the API over HTTP.
    ///
    /// # Errors
    /// Returns [`VantageError::MissingApiKey`] without a key, and the
    /// transport construction errors of [`vantage_http::HttpTransport::new`].
    #[cfg(feature = "http")]
    pub fn new(config: ClientConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            return Err(fail(&config, e));
        }
        let transport = vantage_http::HttpTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client on top of any transport.
    ///
    /// # Errors
    /// Returns [`VantageError::MissingApiKey`] if the configuration has no key.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn ApiTransport>) -> Result<Self> {
        if let Err(e) = config.validate() {
            return Err(fail(&config, e));
        }
        let sink: Arc<dyn TableSink> = if config.export {
            Arc::new(FileSink::new(config.export_path.clone(), config.output))
        } else {
            Arc::new(NoopSink::new())
        };
        debug!(
            transport = transport.name(),
            export = config.export,
            premium = config.premium,
            "Created client"
        );
        Ok(Self {
            catalog: Arc::new(Catalog::bundled().clone()),
            config,
            transport,
            sink,
            log: CallLog::new(),
        })
    }

    /// Replaces the export sink. Tables are only handed to it with `export` on.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TableSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the bundled endpoint catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parameters of every successful call, oldest first, without the key.
    #[must_use]
    pub fn history(&self) -> Vec<RequestParameters> {
        self.log.history()
    }

    /// Parameters of the `n`-th most recent call; `last(1)` is the latest.
    #[must_use]
    pub fn last(&self, n: usize) -> Option<RequestParameters> {
        self.log.last(n)
    }

    /// Sends one request and normalizes its response.
    ///
    /// A failed export is logged and does not fail the call.
    ///
    /// `name` labels the resulting tables. Calendar calls pass their ordering.
    pub(crate) async fn call(
        &self,
        mut params: RequestParameters,
        name: &str,
        order: Option<CalendarOrder>,
    ) -> Result<Option<Dataset>> {
        let function = params.function().to_string();
        let datatype = response_format(&function, &params);
        params.set(API_KEY_PARAM, self.config.api_key.as_str());

        let raw = self
            .transport
            .fetch(&params, datatype)
            .await
            .map_err(|e| fail(&self.config, e))?;
        self.log.record(&params);

        let mut ctx = ShapeContext::new(function.as_str(), name).with_clean(self.config.clean);
        if let Some(order) = order {
            ctx = ctx.with_order(order);
        }
        let is_indicator = self.catalog.is_indicator(&function);
        let dataset =
            normalize(&raw, &ctx, is_indicator).map_err(|e| fail(&self.config, e))?;

        match &dataset {
            Some(dataset) if self.config.export => {
                if let Err(e) = self.export(&params, dataset, is_indicator).await {
                    warn!(function = %function, name, error = %e, "Export failed, returning table anyway");
                }
            }
            Some(_) => {}
            None => debug!(function = %function, name, "Response held no rows"),
        }
        Ok(dataset)
    }

    async fn export(
        &self,
        params: &RequestParameters,
        dataset: &Dataset,
        is_indicator: bool,
    ) -> Result<()> {
        let function = params.function();
        let alias = self.catalog.alias_of(function);
        let request = ExportRequest::new(function, alias, params, Local::now().date_naive())
            .with_indicator(is_indicator);

        match dataset {
            Dataset::Table(table) => self.sink.write(&export_stem(&request)?, table).await,
            Dataset::Statements(pair) => {
                for report in [ReportFrequency::Quarterly, ReportFrequency::Annually] {
                    let stem = export_stem(&request.with_report(report))?;
                    self.sink.write(&stem, pair.get(report)).await?;
                }
                Ok(())
            }
        }
    }
}

/// Format the response will arrive in.
///
/// Calendars and extended intraday history only exist as CSV.
fn response_format(function: &str, params: &RequestParameters) -> DataType {
    match function {
        "EARNINGS_CALENDAR" | "IPO_CALENDAR" | "LISTING_STATUS" | "TIME_SERIES_INTRADAY_EXTENDED" => {
            DataType::Csv
        }
        _ => params
            .get_str("datatype")
            .map_or(DataType::Json, |d| DataType::parse_or_default(&d)),
    }
}

/// Terminates the process on fatal errors when configured to, else hands the
/// error back.
fn fail(config: &ClientConfig, e: VantageError) -> VantageError {
    if config.exit_on_fatal && e.is_fatal() {
        error!(error = %e, "Fatal error, exiting");
        std::process::exit(1);
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_format() {
        let series = RequestParameters::new("TIME_SERIES_DAILY").with("datatype", "csv");
        assert_eq!(response_format("TIME_SERIES_DAILY", &series), DataType::Csv);

        let quote = RequestParameters::new("GLOBAL_QUOTE");
        assert_eq!(response_format("GLOBAL_QUOTE", &quote), DataType::Json);

        let listing = RequestParameters::new("LISTING_STATUS");
        assert_eq!(response_format("LISTING_STATUS", &listing), DataType::Csv);
    }

    #[test]
    fn test_fail_passes_errors_through_by_default() {
        let config = ClientConfig::new("demo");
        let e = fail(&config, VantageError::MissingApiKey);
        assert!(matches!(e, VantageError::MissingApiKey));
    }
}
