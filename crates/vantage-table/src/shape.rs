//! Shape selection and payload pre-checks.

use serde_json::{Map, Value};
use tracing::warn;

use vantage_core::{Dataset, RawResponse, Result, VantageError, types::snippet};

use crate::calendar::Calendar;
use crate::extended::ExtendedIntraday;
use crate::search::Search;
use crate::sector::Sector;
use crate::series::TimeSeries;
use crate::snapshot::{Snapshot, SnapshotKind};
use crate::statement::Statement;

const PROVIDER: &str = "AlphaVantage";
const META_DATA: &str = "Meta Data";
const ERROR_MESSAGE: &str = "Error Message";
const NOTICES: &[&str] = &["Note", "Information"];

/// Ordering applied to calendar tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarOrder {
    /// Column the rows are indexed and sorted by.
    pub index: String,
    /// Sort ascending when true, descending otherwise.
    pub ascending: bool,
}

impl Default for CalendarOrder {
    fn default() -> Self {
        Self {
            index: "symbol".to_string(),
            ascending: true,
        }
    }
}

impl CalendarOrder {
    /// Orders by a column.
    #[must_use]
    pub fn by(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Self::default()
        }
    }

    /// Sets the direction.
    #[must_use]
    pub const fn with_ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }
}

/// What a shape needs to know about the call besides its payload.
#[derive(Clone, Debug)]
pub struct ShapeContext {
    /// Function that was requested.
    pub function: String,
    /// Display name given to the resulting tables.
    pub name: String,
    /// Simplify column names.
    pub clean: bool,
    /// Calendar ordering.
    pub order: CalendarOrder,
}

impl ShapeContext {
    /// Creates a context with default ordering and raw column names.
    #[must_use]
    pub fn new(function: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            name: name.into(),
            clean: false,
            order: CalendarOrder::default(),
        }
    }

    /// Enables simplified column names.
    #[must_use]
    pub const fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Sets the calendar ordering.
    #[must_use]
    pub fn with_order(mut self, order: CalendarOrder) -> Self {
        self.order = order;
        self
    }
}

/// Converts one family of responses into tables.
pub trait ResponseShape {
    /// Normalizes a raw response.
    ///
    /// Returns `Ok(None)` when the response legitimately holds no rows.
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>>;
}

/// Shape handlers, one per response family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// One-row tables.
    Snapshot(Snapshot),
    /// Symbol search matches.
    Search(Search),
    /// Timestamp keyed series.
    TimeSeries(TimeSeries),
    /// Quarterly and annual reports.
    Statement(Statement),
    /// CSV calendars and listings.
    Calendar(Calendar),
    /// CSV intraday history slices.
    ExtendedIntraday(ExtendedIntraday),
    /// Sector performance rankings.
    Sector(Sector),
}

impl ResponseShape for Shape {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        match self {
            Self::Snapshot(s) => s.normalize(raw, ctx),
            Self::Search(s) => s.normalize(raw, ctx),
            Self::TimeSeries(s) => s.normalize(raw, ctx),
            Self::Statement(s) => s.normalize(raw, ctx),
            Self::Calendar(s) => s.normalize(raw, ctx),
            Self::ExtendedIntraday(s) => s.normalize(raw, ctx),
            Self::Sector(s) => s.normalize(raw, ctx),
        }
    }
}

/// Picks the shape for a function.
///
/// Indicators and every function not listed here are time series.
#[must_use]
pub fn shape_for(function: &str, is_indicator: bool) -> Shape {
    if is_indicator {
        return Shape::TimeSeries(TimeSeries);
    }
    match function.to_uppercase().as_str() {
        "GLOBAL_QUOTE" => Shape::Snapshot(Snapshot::new(SnapshotKind::Quote)),
        "CURRENCY_EXCHANGE_RATE" => Shape::Snapshot(Snapshot::new(SnapshotKind::ExchangeRate)),
        "CRYPTO_RATING" => Shape::Snapshot(Snapshot::new(SnapshotKind::Rating)),
        "OVERVIEW" => Shape::Snapshot(Snapshot::new(SnapshotKind::Overview)),
        "SYMBOL_SEARCH" => Shape::Search(Search),
        "INCOME_STATEMENT" | "BALANCE_SHEET" | "CASH_FLOW" => Shape::Statement(Statement),
        "EARNINGS_CALENDAR" | "IPO_CALENDAR" | "LISTING_STATUS" => Shape::Calendar(Calendar),
        "TIME_SERIES_INTRADAY_EXTENDED" => Shape::ExtendedIntraday(ExtendedIntraday),
        "SECTOR" => Shape::Sector(Sector),
        _ => Shape::TimeSeries(TimeSeries),
    }
}

/// Normalizes a response with the shape of `ctx.function`.
///
/// # Errors
/// Returns the pre-check errors described in [`check_payload`] and parse
/// errors from the shape.
pub fn normalize(raw: &RawResponse, ctx: &ShapeContext, is_indicator: bool) -> Result<Option<Dataset>> {
    shape_for(&ctx.function, is_indicator).normalize(raw, ctx)
}

/// Validates a JSON payload and returns its top-level object.
///
/// - `"Error Message"` becomes [`VantageError::Upstream`]
/// - a `"Note"` or `"Information"` with no data becomes [`VantageError::RateLimited`]
/// - an object with nothing but `"Meta Data"` becomes [`VantageError::MissingKey`]
///
/// # Errors
/// As listed above, plus [`VantageError::Parse`] if the payload is not an object.
pub fn check_payload<'a>(value: &'a Value, function: &str) -> Result<&'a Map<String, Value>> {
    let Value::Object(map) = value else {
        return Err(VantageError::Parse(format!(
            "{function}: expected a JSON object, got {}",
            snippet(&value.to_string())
        )));
    };

    if let Some(message) = map.get(ERROR_MESSAGE) {
        return Err(VantageError::Upstream {
            function: function.to_string(),
            message: message.as_str().unwrap_or_default().to_string(),
        });
    }

    let has_data = map
        .keys()
        .any(|k| k != META_DATA && !NOTICES.contains(&k.as_str()));
    if !has_data {
        if let Some(note) = NOTICES.iter().find_map(|n| map.get(*n)) {
            warn!(provider = PROVIDER, function = %function, "Service returned a notice instead of data");
            return Err(VantageError::RateLimited {
                provider: PROVIDER.to_string(),
                message: note.as_str().unwrap_or_default().to_string(),
            });
        }
        return Err(VantageError::MissingKey {
            function: function.to_string(),
            key: "data".to_string(),
        });
    }
    Ok(map)
}

/// Returns the JSON document of a response, or a parse error naming the shape.
pub(crate) fn expect_json<'a>(raw: &'a RawResponse, function: &str) -> Result<&'a Value> {
    match raw {
        RawResponse::Json(value) => Ok(value),
        RawResponse::Text(text) => Err(VantageError::Parse(format!(
            "{function}: expected a JSON response, got text: {}",
            snippet(text)
        ))),
    }
}

/// Returns the CSV text of a response.
///
/// JSON payloads and text bodies that are JSON documents (the service answers
/// errors in JSON even for CSV requests) go through [`check_payload`] first.
pub(crate) fn expect_text<'a>(raw: &'a RawResponse, function: &str) -> Result<&'a str> {
    match raw {
        RawResponse::Text(text) => {
            if text.trim_start().starts_with('{') {
                if let Ok(value) = serde_json::from_str::<Value>(text) {
                    check_payload(&value, function)?;
                    return Err(VantageError::Parse(format!(
                        "{function}: expected CSV, got JSON: {}",
                        snippet(text)
                    )));
                }
            }
            Ok(text)
        }
        RawResponse::Json(value) => {
            check_payload(value, function)?;
            Err(VantageError::Parse(format!(
                "{function}: expected a CSV response, got JSON"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_for() {
        assert!(matches!(shape_for("GLOBAL_QUOTE", false), Shape::Snapshot(_)));
        assert!(matches!(shape_for("symbol_search", false), Shape::Search(_)));
        assert!(matches!(shape_for("CASH_FLOW", false), Shape::Statement(_)));
        assert!(matches!(shape_for("LISTING_STATUS", false), Shape::Calendar(_)));
        assert!(matches!(
            shape_for("TIME_SERIES_INTRADAY_EXTENDED", false),
            Shape::ExtendedIntraday(_)
        ));
        assert!(matches!(shape_for("SECTOR", false), Shape::Sector(_)));
        assert!(matches!(shape_for("FX_DAILY", false), Shape::TimeSeries(_)));
        assert!(matches!(shape_for("OVERVIEW", true), Shape::TimeSeries(_)));
    }

    #[test]
    fn test_check_payload_error_message() {
        let payload = json!({"Error Message": "Invalid API call."});
        let err = check_payload(&payload, "TIME_SERIES_DAILY").unwrap_err();
        assert!(matches!(err, VantageError::Upstream { ref message, .. } if message == "Invalid API call."));
    }

    #[test]
    fn test_check_payload_rate_limited() {
        let payload = json!({"Note": "Thank you for using Alpha Vantage! 5 calls per minute."});
        let err = check_payload(&payload, "TIME_SERIES_DAILY").unwrap_err();
        assert!(matches!(err, VantageError::RateLimited { .. }));

        let payload = json!({"Information": "premium endpoint"});
        assert!(matches!(
            check_payload(&payload, "FX_DAILY").unwrap_err(),
            VantageError::RateLimited { .. }
        ));
    }

    #[test]
    fn test_check_payload_missing_data() {
        let payload = json!({"Meta Data": {"1. Information": "Daily Prices"}});
        let err = check_payload(&payload, "TIME_SERIES_DAILY").unwrap_err();
        assert!(matches!(err, VantageError::MissingKey { .. }));
        assert!(err.is_fatal());

        assert!(matches!(
            check_payload(&json!({}), "OVERVIEW").unwrap_err(),
            VantageError::MissingKey { .. }
        ));
        assert!(matches!(
            check_payload(&json!([1, 2]), "OVERVIEW").unwrap_err(),
            VantageError::Parse(_)
        ));
    }

    #[test]
    fn test_expect_text_surfaces_json_errors() {
        let raw = RawResponse::Text("{\"Error Message\": \"bad horizon\"}".to_string());
        let err = expect_text(&raw, "EARNINGS_CALENDAR").unwrap_err();
        assert!(matches!(err, VantageError::Upstream { .. }));

        let raw = RawResponse::Text("symbol,name\nIBM,International".to_string());
        assert!(expect_text(&raw, "LISTING_STATUS").is_ok());
    }

    #[test]
    fn test_calendar_order_default() {
        let order = CalendarOrder::default();
        assert_eq!(order.index, "symbol");
        assert!(order.ascending);
        assert!(!CalendarOrder::by("ipoDate").with_ascending(false).ascending);
    }
}
