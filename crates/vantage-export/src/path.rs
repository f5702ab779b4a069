//! File names of exported tables.

use chrono::NaiveDate;

use vantage_core::{ReportFrequency, RequestParameters, Result, VantageError};

/// Everything needed to name the export of one call.
#[derive(Clone, Copy, Debug)]
pub struct ExportRequest<'a> {
    /// Function that was called.
    pub function: &'a str,
    /// Short alias of the function; the function itself for indicators.
    pub alias: &'a str,
    /// Parameters of the call.
    pub params: &'a RequestParameters,
    /// Whether the function is a technical indicator.
    pub is_indicator: bool,
    /// Reporting frequency for statement tables.
    pub report: Option<ReportFrequency>,
    /// Date stamped into calendar exports.
    pub today: NaiveDate,
}

impl<'a> ExportRequest<'a> {
    /// Creates a request for a plain table.
    #[must_use]
    pub const fn new(
        function: &'a str,
        alias: &'a str,
        params: &'a RequestParameters,
        today: NaiveDate,
    ) -> Self {
        Self {
            function,
            alias,
            params,
            is_indicator: false,
            report: None,
            today,
        }
    }

    /// Marks the function as an indicator.
    #[must_use]
    pub const fn with_indicator(mut self, is_indicator: bool) -> Self {
        self.is_indicator = is_indicator;
        self
    }

    /// Sets the statement frequency.
    #[must_use]
    pub const fn with_report(mut self, report: ReportFrequency) -> Self {
        self.report = Some(report);
        self
    }

    fn param(&self, name: &str) -> Result<String> {
        self.params.get_str(name).ok_or_else(|| {
            VantageError::Export(format!("{} export needs the {name} parameter", self.function))
        })
    }

    fn adjusted_suffix(&self) -> &'static str {
        if self.params.get_str("adjusted").as_deref() == Some("true") {
            "_ADJ"
        } else {
            ""
        }
    }
}

/// Derives the file stem (name without extension) of an exported table.
///
/// # Errors
/// Returns [`VantageError::Export`] if a parameter the name is built from is
/// missing, or a statement table comes without its reporting frequency.
pub fn export_stem(req: &ExportRequest<'_>) -> Result<String> {
    let today = req.today.format("%Y-%m-%d");
    let stem = match req.function {
        "CURRENCY_EXCHANGE_RATE" => {
            format!("{}{}", req.param("from_currency")?, req.param("to_currency")?)
        }
        "FX_DAILY" | "FX_WEEKLY" | "FX_MONTHLY" => format!(
            "{}{}_{}",
            req.param("from_symbol")?,
            req.param("to_symbol")?,
            req.alias.replace("FX", "")
        ),
        "FX_INTRADAY" => format!(
            "{}{}_{}",
            req.param("from_symbol")?,
            req.param("to_symbol")?,
            req.param("interval")?
        ),
        "DIGITAL_CURRENCY_DAILY" | "DIGITAL_CURRENCY_WEEKLY" | "DIGITAL_CURRENCY_MONTHLY" => {
            format!(
                "{}{}_{}",
                req.param("symbol")?,
                req.param("market")?,
                req.alias.replace('C', "")
            )
        }
        "TIME_SERIES_INTRADAY_EXTENDED" => {
            let slice = req
                .params
                .get_str("slice")
                .unwrap_or_else(|| "year1month1".to_string())
                .replace("year", "Y")
                .replace("month", "M");
            format!(
                "{}_{}_{}_{}{}",
                req.param("symbol")?,
                req.alias,
                req.param("interval")?,
                slice,
                req.adjusted_suffix()
            )
        }
        "OVERVIEW" => req.param("symbol")?,
        "SYMBOL_SEARCH" => format!("SEARCH_{}", req.param("keywords")?),
        "INCOME_STATEMENT" | "BALANCE_SHEET" | "CASH_FLOW" => {
            let report = req.report.ok_or_else(|| {
                VantageError::Export(format!("{} export needs a report frequency", req.function))
            })?;
            let code = match req.function {
                "INCOME_STATEMENT" => "IS",
                "BALANCE_SHEET" => "BS",
                _ => "CF",
            };
            format!("{}_{code}_{}", req.param("symbol")?, report.tag())
        }
        "CRYPTO_RATING" => format!("{}_RATING", req.param("symbol")?),
        "TIME_SERIES_INTRADAY" => format!(
            "{}_{}{}",
            req.param("symbol")?,
            req.param("interval")?,
            req.adjusted_suffix()
        ),
        "EARNINGS_CALENDAR" => {
            let horizon = req
                .params
                .get_str("horizon")
                .unwrap_or_else(|| "3month".to_string())
                .to_uppercase();
            match req.params.get_str("symbol") {
                Some(symbol) => format!("EARNINGS_{symbol}_{horizon}_{today}"),
                None => format!("EARNINGS_{horizon}_{today}"),
            }
        }
        "IPO_CALENDAR" => format!("IPOS_{today}"),
        "LISTING_STATUS" => {
            let prefix = match req.params.get_str("state").as_deref() {
                Some("delisted") => "DE",
                _ => "",
            };
            let mut stem = format!("{prefix}LISTED_{today}");
            if let Some(date) = req.params.get_str("date") {
                stem.push_str(&format!("_FOR_{date}"));
            }
            stem
        }
        "SECTOR" => format!("SECTOR_{today}"),
        _ if req.alias.len() == 2 && req.alias.starts_with('C') => {
            format!("{}{}", req.param("symbol")?, req.param("market")?)
        }
        _ if req.is_indicator => {
            let interval = req.param("interval")?;
            let mut stem = format!(
                "{}_{}_{}",
                req.param("symbol")?,
                initial(&interval),
                req.alias
            );
            if let Some(series_type) = req.params.get_str("series_type") {
                stem.push_str(&format!("_{}", initial(&series_type)));
            }
            if let Some(period) = req.params.get_str("time_period") {
                stem.push_str(&format!("_{period}"));
            }
            stem
        }
        _ => format!("{}_{}", req.param("symbol")?, req.alias),
    };
    Ok(sanitize(&stem))
}

fn initial(value: &str) -> String {
    value.chars().next().map(|c| c.to_uppercase().to_string()).unwrap_or_default()
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}
