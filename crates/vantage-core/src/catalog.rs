//! Endpoint catalog.
//!
//! The catalog lists every function the API exposes together with its short
//! alias and its required and optional parameters, plus the value lists the
//! request builder validates against. It is packaged with the crate as
//! `data/api.json` and parsed once on first use.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Result, VantageError};

const BUNDLED_CATALOG: &str = include_str!("../data/api.json");

static BUNDLED: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(BUNDLED_CATALOG).expect("bundled data/api.json must be a valid catalog")
});

/// Description of a single API function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Upstream function name, e.g. `TIME_SERIES_DAILY`.
    pub function: String,
    /// Short code, e.g. `D`. Indicators have none.
    #[serde(default)]
    pub alias: Option<String>,
    /// Parameters the function cannot be called without.
    #[serde(default)]
    pub required: Vec<String>,
    /// Parameters the function accepts in addition.
    #[serde(default)]
    pub optional: Vec<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
struct CatalogFile {
    series: Vec<EndpointDescriptor>,
    indicator: Vec<EndpointDescriptor>,
    datatype: Vec<String>,
    outputsize: Vec<String>,
    series_interval: Vec<String>,
    indicator_interval: Vec<String>,
    series_type: Vec<String>,
    horizon: Vec<String>,
    listing_state: Vec<String>,
    slice: Vec<String>,
    matype: Vec<u32>,
}

/// The set of known endpoints and parameter value lists.
#[derive(Clone, Debug)]
pub struct Catalog {
    series: Vec<EndpointDescriptor>,
    indicators: Vec<EndpointDescriptor>,
    /// Uppercased function name -> position in `series` or `indicators`.
    by_function: HashMap<String, (bool, usize)>,
    /// Uppercased alias -> function name.
    by_alias: HashMap<String, String>,
    datatype: Vec<String>,
    outputsize: Vec<String>,
    series_interval: Vec<String>,
    indicator_interval: Vec<String>,
    series_type: Vec<String>,
    horizon: Vec<String>,
    listing_state: Vec<String>,
    slice: Vec<String>,
    matype: Vec<u32>,
}

impl Catalog {
    /// Returns the catalog packaged with the crate.
    ///
    /// # Panics
    /// Panics if the packaged catalog is malformed, which is a build defect.
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    /// Returns [`VantageError::Catalog`] if the file is missing or malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| VantageError::Catalog(format!("{} does not exist: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parses a catalog from its JSON text.
    ///
    /// # Errors
    /// Returns [`VantageError::Catalog`] if the text is not a valid catalog.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(content).map_err(|e| VantageError::Catalog(e.to_string()))?;

        let mut by_function = HashMap::new();
        let mut by_alias = HashMap::new();
        for (idx, descriptor) in file.series.iter().enumerate() {
            by_function.insert(descriptor.function.to_uppercase(), (false, idx));
            if let Some(alias) = &descriptor.alias {
                by_alias.insert(alias.to_uppercase(), descriptor.function.clone());
            }
        }
        for (idx, descriptor) in file.indicator.iter().enumerate() {
            by_function.insert(descriptor.function.to_uppercase(), (true, idx));
        }

        Ok(Self {
            series: file.series,
            indicators: file.indicator,
            by_function,
            by_alias,
            datatype: file.datatype,
            outputsize: file.outputsize,
            series_interval: file.series_interval,
            indicator_interval: file.indicator_interval,
            series_type: file.series_type,
            horizon: file.horizon,
            listing_state: file.listing_state,
            slice: file.slice,
            matype: file.matype,
        })
    }

    /// Looks up the descriptor of a function by its full name.
    #[must_use]
    pub fn descriptor(&self, function: &str) -> Option<&EndpointDescriptor> {
        self.by_function
            .get(&function.trim().to_uppercase())
            .map(|&(indicator, idx)| {
                if indicator {
                    &self.indicators[idx]
                } else {
                    &self.series[idx]
                }
            })
    }

    /// Resolves an alias or a function name to the function name.
    ///
    /// Matching is case-insensitive. Returns `None` when the input is neither.
    #[must_use]
    pub fn resolve(&self, code_or_name: &str) -> Option<&str> {
        let key = code_or_name.trim().to_uppercase();
        if let Some(function) = self.by_alias.get(&key) {
            return Some(function.as_str());
        }
        self.descriptor(&key).map(|d| d.function.as_str())
    }

    /// Returns the short alias of a function, or the input itself when the
    /// function has none.
    #[must_use]
    pub fn alias_of<'a>(&'a self, function: &'a str) -> &'a str {
        self.descriptor(function)
            .and_then(|d| d.alias.as_deref())
            .unwrap_or(function)
    }

    /// Required parameters of a function; empty for unknown functions.
    #[must_use]
    pub fn required(&self, function: &str) -> &[String] {
        self.descriptor(function).map_or(&[], |d| d.required.as_slice())
    }

    /// Optional parameters of a function; empty for unknown functions.
    #[must_use]
    pub fn optional(&self, function: &str) -> &[String] {
        self.descriptor(function).map_or(&[], |d| d.optional.as_slice())
    }

    /// Returns true if the function is a technical indicator.
    #[must_use]
    pub fn is_indicator(&self, function: &str) -> bool {
        self.by_function
            .get(&function.trim().to_uppercase())
            .is_some_and(|&(indicator, _)| indicator)
    }

    /// Names of all non-indicator functions, in catalog order.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|d| d.function.as_str())
    }

    /// Names of all indicator functions, in catalog order.
    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.indicators.iter().map(|d| d.function.as_str())
    }

    /// `(alias, function)` pairs, in catalog order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.series
            .iter()
            .filter_map(|d| d.alias.as_deref().map(|a| (a, d.function.as_str())))
    }

    /// Accepted response formats.
    #[must_use]
    pub fn datatypes(&self) -> &[String] {
        &self.datatype
    }

    /// Accepted output sizes.
    #[must_use]
    pub fn output_sizes(&self) -> &[String] {
        &self.outputsize
    }

    /// Intervals accepted by intraday series.
    #[must_use]
    pub fn series_intervals(&self) -> &[String] {
        &self.series_interval
    }

    /// Intervals accepted by indicators.
    #[must_use]
    pub fn indicator_intervals(&self) -> &[String] {
        &self.indicator_interval
    }

    /// Price fields an indicator can be computed on.
    #[must_use]
    pub fn series_types(&self) -> &[String] {
        &self.series_type
    }

    /// Earnings calendar horizons.
    #[must_use]
    pub fn horizons(&self) -> &[String] {
        &self.horizon
    }

    /// Listing states.
    #[must_use]
    pub fn listing_states(&self) -> &[String] {
        &self.listing_state
    }

    /// Extended intraday slices.
    #[must_use]
    pub fn slices(&self) -> &[String] {
        &self.slice
    }

    /// Moving average type codes.
    #[must_use]
    pub fn matypes(&self) -> &[u32] {
        &self.matype
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled();
        assert!(catalog.functions().count() > 20);
        assert!(catalog.indicators().any(|f| f == "BBANDS"));
        assert_eq!(catalog.matypes(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(catalog.slices().len(), 24);
    }

    #[test]
    fn test_resolve_aliases_and_names() {
        let catalog = Catalog::bundled();
        assert_eq!(catalog.resolve("DA"), Some("TIME_SERIES_DAILY_ADJUSTED"));
        assert_eq!(catalog.resolve("da"), Some("TIME_SERIES_DAILY_ADJUSTED"));
        assert_eq!(catalog.resolve("FX"), Some("CURRENCY_EXCHANGE_RATE"));
        assert_eq!(catalog.resolve("time_series_weekly"), Some("TIME_SERIES_WEEKLY"));
        assert_eq!(catalog.resolve("sma"), Some("SMA"));
        assert_eq!(catalog.resolve("MSFT"), None);
    }

    #[test]
    fn test_alias_of() {
        let catalog = Catalog::bundled();
        assert_eq!(catalog.alias_of("TIME_SERIES_INTRADAY"), "I");
        assert_eq!(catalog.alias_of("DIGITAL_CURRENCY_DAILY"), "CD");
        assert_eq!(catalog.alias_of("RSI"), "RSI");
        assert_eq!(catalog.alias_of("UNKNOWN"), "UNKNOWN");
    }

    #[test]
    fn test_parameters() {
        let catalog = Catalog::bundled();
        assert_eq!(catalog.required("FX_INTRADAY"), &["from_symbol", "to_symbol", "interval"]);
        assert!(catalog.optional("BBANDS").contains(&"nbdevup".to_string()));
        assert!(catalog.required("NOPE").is_empty());
        assert!(catalog.is_indicator("macd"));
        assert!(!catalog.is_indicator("TIME_SERIES_DAILY"));
    }

    #[test]
    fn test_aliases_are_unique() {
        let catalog = Catalog::bundled();
        let mut seen = std::collections::HashSet::new();
        for (alias, _) in catalog.aliases() {
            assert!(seen.insert(alias), "duplicate alias {alias}");
        }
    }

    #[test]
    fn test_malformed_catalog() {
        let err = Catalog::from_json("{\"series\": []}").unwrap_err();
        assert!(matches!(err, VantageError::Catalog(_)));

        let err = Catalog::from_path("/definitely/not/here/api.json").unwrap_err();
        assert!(matches!(err, VantageError::Catalog(_)));
    }
}
