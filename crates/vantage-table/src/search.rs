//! Symbol search matches.

use tracing::debug;

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::columns::{frame, json_text, rename_all, string_column};
use crate::shape::{ResponseShape, ShapeContext, check_payload, expect_json};

const MATCHES_KEY: &str = "bestMatches";

const SEARCH_COLUMNS: &[&str] = &[
    "symbol",
    "name",
    "type",
    "region",
    "market_open",
    "market_close",
    "tz",
    "currency",
    "match",
];

/// One row per match, all values kept as text. No matches is no result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Search;

impl ResponseShape for Search {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let map = check_payload(expect_json(raw, &ctx.function)?, &ctx.function)?;
        let matches = map
            .get(MATCHES_KEY)
            .and_then(|v| v.as_array())
            .ok_or_else(|| VantageError::MissingKey {
                function: ctx.function.clone(),
                key: MATCHES_KEY.to_string(),
            })?;

        if matches.is_empty() {
            debug!(keywords = %ctx.name, "Search returned no matches");
            return Ok(None);
        }

        let mut names: Vec<String> = Vec::new();
        for item in matches.iter().filter_map(|m| m.as_object()) {
            for key in item.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .iter()
            .map(|name| {
                let values = matches
                    .iter()
                    .map(|m| m.get(name).and_then(json_text))
                    .collect();
                string_column(name, values)
            })
            .collect();
        let mut df = frame(columns)?;
        if ctx.clean {
            rename_all(&mut df, SEARCH_COLUMNS)?;
        }

        Ok(Some(Dataset::Table(NormalizedTable::new(
            df,
            TableIndex::Synthetic,
            &ctx.name,
        ))))
    }
}
