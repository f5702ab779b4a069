//! Endpoint methods of [`AlphaVantage`].
//!
//! Each method builds the parameters of one function, validates them against
//! the catalog and makes at most one call. Validation failures log a warning
//! and return `Ok(None)` without touching the network.

use std::collections::BTreeMap;

use tracing::warn;

use vantage_core::{
    Dataset, NormalizedTable, Options, RequestParameters, Result, StatementPair, Symbol,
    normalize_interval,
    params::{API_KEY_PARAM, FUNCTION_PARAM},
    validate_option,
};
use vantage_table::{CalendarOrder, Shape, shape_for};

use crate::client::AlphaVantage;

const FX_FUNCTIONS: &[&str] = &["FX_INTRADAY", "FX_DAILY", "FX_WEEKLY", "FX_MONTHLY"];

const CRYPTO_FUNCTIONS: &[&str] = &[
    "CRYPTO_INTRADAY",
    "DIGITAL_CURRENCY_DAILY",
    "DIGITAL_CURRENCY_WEEKLY",
    "DIGITAL_CURRENCY_MONTHLY",
];

const DEFAULT_CRYPTO_INTERVAL: &str = "5min";
const DEFAULT_HORIZON: &str = "3month";
const DEFAULT_LISTING_STATE: &str = "active";

fn into_table(result: Result<Option<Dataset>>) -> Result<Option<NormalizedTable>> {
    result.map(|d| d.and_then(Dataset::into_table))
}

fn into_statements(result: Result<Option<Dataset>>) -> Result<Option<StatementPair>> {
    result.map(|d| d.and_then(Dataset::into_statements))
}

/// Lowercased `value` if it is one of `allowed`, else `default`.
fn choice(name: &str, value: Option<&str>, allowed: &[String], default: &str) -> String {
    match value.map(str::to_lowercase) {
        Some(value) if allowed.contains(&value) => value,
        Some(value) => {
            warn!(option = name, value = %value, default, "Unknown value, using default");
            default.to_string()
        }
        None => default.to_string(),
    }
}

impl AlphaVantage {
    /// Fetches any series or indicator for a symbol.
    ///
    /// `function` is an alias (`"DA"`) or a function name
    /// (`"TIME_SERIES_DAILY_ADJUSTED"`, `"SMA"`). When it is unknown but
    /// `symbol` is a known function the two are swapped.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn data(
        &self,
        symbol: &str,
        function: &str,
        options: &Options,
    ) -> Result<Option<Dataset>> {
        let Some((symbol, function)) = self.resolve_subject(symbol, function) else {
            return Ok(None);
        };
        let base = RequestParameters::new(function).with("symbol", symbol.as_str());
        match self.build(base, options) {
            Some(params) => self.call(params, symbol.as_str(), None).await,
            None => Ok(None),
        }
    }

    /// Fetches the same function for several symbols, one call after another.
    ///
    /// The result is keyed by the uppercased symbols.
    ///
    /// # Errors
    /// Stops at the first failing call and returns its error.
    pub async fn data_batch(
        &self,
        symbols: &[&str],
        function: &str,
        options: &Options,
    ) -> Result<BTreeMap<Symbol, Option<Dataset>>> {
        let mut results = BTreeMap::new();
        for symbol in symbols {
            let dataset = self.data(symbol, function, options).await?;
            results.insert(Symbol::new(*symbol), dataset);
        }
        Ok(results)
    }

    /// Daily prices.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn daily(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "D", &Options::new()).await
    }

    /// Daily prices with dividends and splits.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn daily_adjusted(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "DA", &Options::new()).await
    }

    /// Weekly prices.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn weekly(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "W", &Options::new()).await
    }

    /// Weekly adjusted prices.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn weekly_adjusted(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "WA", &Options::new()).await
    }

    /// Monthly prices.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn monthly(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "M", &Options::new()).await
    }

    /// Monthly adjusted prices.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn monthly_adjusted(&self, symbol: &str) -> Result<Option<Dataset>> {
        self.data(symbol, "MA", &Options::new()).await
    }

    /// Fetches a technical indicator.
    ///
    /// `interval` and `series_type` in `options` must be catalog values;
    /// anything else returns `None`.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn indicator(
        &self,
        symbol: &str,
        function: &str,
        options: &Options,
    ) -> Result<Option<NormalizedTable>> {
        let Some(resolved) = self
            .catalog()
            .resolve(function)
            .filter(|f| self.catalog().is_indicator(f))
        else {
            warn!(function, "Not a technical indicator");
            return Ok(None);
        };
        let symbol = Symbol::new(symbol);
        let base = RequestParameters::new(resolved).with("symbol", symbol.as_str());
        match self.build(base, options) {
            Some(params) => into_table(self.call(params, symbol.as_str(), None).await),
            None => Ok(None),
        }
    }

    /// Intraday prices at `interval` (`"5min"` or `"5"`).
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn intraday(
        &self,
        symbol: &str,
        interval: &str,
        adjusted: bool,
    ) -> Result<Option<NormalizedTable>> {
        let symbol = Symbol::new(symbol);
        let base = RequestParameters::new("TIME_SERIES_INTRADAY")
            .with("symbol", symbol.as_str())
            .with("interval", interval)
            .with("adjusted", adjusted);
        match self.build(base, &Options::new()) {
            Some(params) => into_table(self.call(params, symbol.as_str(), None).await),
            None => Ok(None),
        }
    }

    /// One month slice of the last two years of intraday prices.
    ///
    /// An unknown `slice` is left out and the API serves the latest month.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn intraday_extended(
        &self,
        symbol: &str,
        interval: &str,
        slice: Option<&str>,
        adjusted: bool,
    ) -> Result<Option<NormalizedTable>> {
        let symbol = Symbol::new(symbol);
        let mut base = RequestParameters::new("TIME_SERIES_INTRADAY_EXTENDED")
            .with("symbol", symbol.as_str())
            .with("interval", interval)
            .with("adjusted", adjusted);
        if let Some(slice) = slice {
            let slice = slice.to_lowercase();
            if self.catalog().slices().contains(&slice) {
                base.set("slice", slice);
            } else {
                warn!(slice = %slice, "Unknown slice, omitting it");
            }
        }
        match self.build(base, &Options::new()) {
            Some(params) => into_table(self.call(params, symbol.as_str(), None).await),
            None => Ok(None),
        }
    }

    /// Foreign exchange series; `function` is `FXI`, `FXD`, `FXW` or `FXM`.
    ///
    /// Intraday needs an `interval` option.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn fx(
        &self,
        from: &str,
        to: &str,
        function: &str,
        options: &Options,
    ) -> Result<Option<NormalizedTable>> {
        let Some(resolved) = self
            .catalog()
            .resolve(function)
            .filter(|f| FX_FUNCTIONS.contains(f))
        else {
            warn!(function, "Not a foreign exchange function");
            return Ok(None);
        };
        if resolved == "FX_INTRADAY" && !options.contains_key("interval") {
            warn!(function = resolved, "Intraday exchange rates need an interval");
            return Ok(None);
        }
        let (from, to) = (Symbol::new(from), Symbol::new(to));
        let base = RequestParameters::new(resolved)
            .with("from_symbol", from.as_str())
            .with("to_symbol", to.as_str());
        let name = format!("{from}{to}");
        match self.build(base, options) {
            Some(params) => into_table(self.call(params, &name, None).await),
            None => Ok(None),
        }
    }

    /// Realtime exchange rate between two currencies.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn fxrate(&self, from: &str, to: &str) -> Result<Option<NormalizedTable>> {
        let (from, to) = (Symbol::new(from), Symbol::new(to));
        let params = RequestParameters::new("CURRENCY_EXCHANGE_RATE")
            .with("from_currency", from.as_str())
            .with("to_currency", to.as_str());
        into_table(self.call(params, &format!("{from}{to}"), None).await)
    }

    /// Latest price and volume of a symbol.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn quote(&self, symbol: &str) -> Result<Option<NormalizedTable>> {
        let symbol = Symbol::new(symbol);
        let params = RequestParameters::new("GLOBAL_QUOTE").with("symbol", symbol.as_str());
        into_table(self.call(params, symbol.as_str(), None).await)
    }

    /// Symbols matching `keywords`. No match returns `None`.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn search(&self, keywords: &str) -> Result<Option<NormalizedTable>> {
        let params = RequestParameters::new("SYMBOL_SEARCH").with("keywords", keywords);
        into_table(self.call(params, keywords, None).await)
    }

    /// Digital currency prices in `market`; `function` is `CI`, `CD`, `CW` or `CM`.
    ///
    /// Crypto intraday is requested at 5 minute bars.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn digital(
        &self,
        symbol: &str,
        market: &str,
        function: &str,
    ) -> Result<Option<NormalizedTable>> {
        let Some(resolved) = self
            .catalog()
            .resolve(function)
            .filter(|f| CRYPTO_FUNCTIONS.contains(f))
        else {
            warn!(function, "Not a digital currency function");
            return Ok(None);
        };
        let (symbol, market) = (Symbol::new(symbol), Symbol::new(market));
        let mut base = RequestParameters::new(resolved)
            .with("symbol", symbol.as_str())
            .with("market", market.as_str());
        if resolved == "CRYPTO_INTRADAY" {
            base.set("interval", DEFAULT_CRYPTO_INTERVAL);
        }
        match self.build(base, &Options::new()) {
            Some(params) => into_table(self.call(params, symbol.as_str(), None).await),
            None => Ok(None),
        }
    }

    /// Fundamental crypto asset rating.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn crypto_rating(&self, symbol: &str) -> Result<Option<NormalizedTable>> {
        let symbol = Symbol::new(symbol);
        let params = RequestParameters::new("CRYPTO_RATING").with("symbol", symbol.as_str());
        into_table(self.call(params, symbol.as_str(), None).await)
    }

    /// Sector performance over several horizons.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn sectors(&self) -> Result<Option<NormalizedTable>> {
        let name = self.catalog().alias_of("SECTOR").to_string();
        into_table(self.call(RequestParameters::new("SECTOR"), &name, None).await)
    }

    /// Company information and key ratios.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn overview(&self, symbol: &str) -> Result<Option<NormalizedTable>> {
        let symbol = Symbol::new(symbol);
        let params = RequestParameters::new("OVERVIEW").with("symbol", symbol.as_str());
        into_table(self.call(params, symbol.as_str(), None).await)
    }

    /// Quarterly and annual balance sheets.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn balance(&self, symbol: &str) -> Result<Option<StatementPair>> {
        self.statement("BALANCE_SHEET", symbol).await
    }

    /// Quarterly and annual income statements.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn income(&self, symbol: &str) -> Result<Option<StatementPair>> {
        self.statement("INCOME_STATEMENT", symbol).await
    }

    /// Quarterly and annual cash flow statements.
    ///
    /// # Errors
    /// Returns transport and normalization errors.
    pub async fn cashflow(&self, symbol: &str) -> Result<Option<StatementPair>> {
        self.statement("CASH_FLOW", symbol).await
    }

    async fn statement(&self, function: &str, symbol: &str) -> Result<Option<StatementPair>> {
        let symbol = Symbol::new(symbol);
        let params = RequestParameters::new(function).with("symbol", symbol.as_str());
        into_statements(self.call(params, symbol.as_str(), None).await)
    }

    /// Expected earnings over the next `horizon` (`3month`, `6month` or
    /// `12month`), for one symbol or the whole market.
    ///
    /// # Errors
    /// Returns transport and normalization errors, and
    /// [`vantage_core::VantageError::InvalidParameter`] if `order` names a
    /// column the calendar does not have.
    pub async fn earnings(
        &self,
        symbol: Option<&str>,
        horizon: Option<&str>,
        order: CalendarOrder,
    ) -> Result<Option<NormalizedTable>> {
        let horizon = choice(
            "horizon",
            horizon,
            self.catalog().horizons(),
            DEFAULT_HORIZON,
        );
        let mut params = RequestParameters::new("EARNINGS_CALENDAR");
        let name = match symbol.map(Symbol::new) {
            Some(symbol) => {
                params.set("symbol", symbol.as_str());
                symbol.to_string()
            }
            None => self.catalog().alias_of("EARNINGS_CALENDAR").to_string(),
        };
        params.set("horizon", horizon);
        into_table(self.call(params, &name, Some(order)).await)
    }

    /// Expected initial public offerings over the next three months.
    ///
    /// # Errors
    /// Same as [`AlphaVantage::earnings`].
    pub async fn ipos(&self, order: CalendarOrder) -> Result<Option<NormalizedTable>> {
        let name = self.catalog().alias_of("IPO_CALENDAR").to_string();
        into_table(
            self.call(RequestParameters::new("IPO_CALENDAR"), &name, Some(order))
                .await,
        )
    }

    /// Active or delisted securities, optionally as of `date` (`YYYY-MM-DD`).
    ///
    /// # Errors
    /// Same as [`AlphaVantage::earnings`].
    pub async fn listed(
        &self,
        date: Option<&str>,
        state: Option<&str>,
        order: CalendarOrder,
    ) -> Result<Option<NormalizedTable>> {
        let state = choice(
            "state",
            state,
            self.catalog().listing_states(),
            DEFAULT_LISTING_STATE,
        );
        let mut params = RequestParameters::new("LISTING_STATUS");
        if let Some(date) = date {
            params.set("date", date);
        }
        params.set("state", state);
        let name = self.catalog().alias_of("LISTING_STATUS").to_string();
        into_table(self.call(params, &name, Some(order)).await)
    }

    /// Resolves the function of a `data` call, swapping it with the symbol
    /// when only the symbol is a known function.
    fn resolve_subject(&self, symbol: &str, function: &str) -> Option<(Symbol, String)> {
        if let Some(resolved) = self.catalog().resolve(function) {
            return Some((Symbol::new(symbol), resolved.to_string()));
        }
        match self.catalog().resolve(symbol) {
            Some(resolved) => {
                warn!(symbol, function, "Unknown function, swapping function and symbol");
                Some((Symbol::new(function), resolved.to_string()))
            }
            None => {
                warn!(function, "Unknown function");
                None
            }
        }
    }

    /// Completes the parameters of a call from the config and `options`.
    ///
    /// Returns `None` if the interval or series type is not a catalog value.
    fn build(&self, mut params: RequestParameters, options: &Options) -> Option<RequestParameters> {
        let catalog = self.catalog();
        let function = params.function().to_string();
        let is_indicator = catalog.is_indicator(&function);
        let required = catalog.required(&function);
        let optional = catalog.optional(&function);
        let accepts = |name: &str| optional.iter().any(|o| o == name);

        if !is_indicator && matches!(shape_for(&function, false), Shape::TimeSeries(_)) {
            if accepts("datatype") {
                params.set("datatype", self.config().datatype.as_str());
            }
            if accepts("outputsize") {
                params.set("outputsize", self.config().output_size.as_str());
            }
        }

        for (name, value) in options {
            if name == FUNCTION_PARAM || name == API_KEY_PARAM {
                continue;
            }
            let is_required = required.iter().any(|r| r == name);
            if is_required && params.contains(name) {
                continue;
            }
            if !is_required && !accepts(name) {
                warn!(function = %function, option = %name, "Ignoring option the function does not take");
                continue;
            }
            match validate_option(catalog.matypes(), name, value) {
                Some(value) => params.set(name.as_str(), value),
                None => {
                    warn!(function = %function, option = %name, value = %value, "Dropping invalid option");
                }
            }
        }

        if let Some(interval) = params.get_str("interval") {
            let interval = normalize_interval(&interval);
            let allowed = if is_indicator {
                catalog.indicator_intervals()
            } else {
                catalog.series_intervals()
            };
            if !allowed.contains(&interval) {
                warn!(function = %function, interval = %interval, "Invalid interval");
                return None;
            }
            params.set("interval", interval);
        }

        if let Some(series_type) = params.get_str("series_type") {
            let series_type = series_type.to_lowercase();
            if !catalog.series_types().contains(&series_type) {
                warn!(function = %function, series_type = %series_type, "Invalid series type");
                return None;
            }
            params.set("series_type", series_type);
        }

        Some(params)
    }
}
