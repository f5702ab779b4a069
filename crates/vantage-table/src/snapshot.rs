//! One-row tables: quotes, exchange rates, crypto ratings and company overviews.

use serde_json::Value;
use tracing::warn;

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::columns::{
    clean_name, frame, infer_column, json_text, rename_all, string_column, strip_ordinal,
    unique_names,
};
use crate::shape::{ResponseShape, ShapeContext, check_payload, expect_json};

const EXCHANGE_RATE_COLUMNS: &[&str] = &[
    "index",
    "from",
    "from_name",
    "to",
    "to_name",
    "rate",
    "refreshed",
    "tz",
    "bid",
    "ask",
];

/// Which snapshot payload is being normalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// `GLOBAL_QUOTE`, nested under `"Global Quote"`.
    Quote,
    /// `CURRENCY_EXCHANGE_RATE`, nested under `"Realtime Currency Exchange Rate"`.
    ExchangeRate,
    /// `CRYPTO_RATING`, nested under `"Crypto Rating (FCAS)"`.
    Rating,
    /// `OVERVIEW`, a flat object.
    Overview,
}

/// Produces exactly one row per response.
///
/// Nested payloads keep their payload key in an `index` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    kind: SnapshotKind,
}

impl Snapshot {
    /// Creates a snapshot shape.
    #[must_use]
    pub const fn new(kind: SnapshotKind) -> Self {
        Self { kind }
    }

    /// The payload kind.
    #[must_use]
    pub const fn kind(&self) -> SnapshotKind {
        self.kind
    }

    fn flat(&self, map: &serde_json::Map<String, Value>, ctx: &ShapeContext) -> Result<NormalizedTable> {
        let columns = map
            .iter()
            .map(|(k, v)| infer_column(k, vec![json_text(v)]))
            .collect();
        let df = frame(columns)?;
        let index = if ctx.clean && df.column("Symbol").is_ok() {
            TableIndex::Column("Symbol".to_string())
        } else {
            TableIndex::Synthetic
        };
        Ok(NormalizedTable::new(df, index, &ctx.name))
    }

    fn nested(
        &self,
        key: &str,
        fields: &serde_json::Map<String, Value>,
        ctx: &ShapeContext,
    ) -> Result<NormalizedTable> {
        let mut columns = vec![string_column("index", vec![Some(key.to_string())])];
        for (name, value) in fields {
            columns.push(infer_column(name, vec![json_text(value)]));
        }
        let mut df = frame(columns)?;

        if !ctx.clean {
            return Ok(NormalizedTable::new(df, TableIndex::Synthetic, &ctx.name));
        }

        let index = match self.kind {
            SnapshotKind::ExchangeRate => {
                if rename_all(&mut df, EXCHANGE_RATE_COLUMNS)? {
                    TableIndex::Column("refreshed".to_string())
                } else {
                    let raw: Vec<String> =
                        df.get_column_names().iter().map(|n| n.to_string()).collect();
                    df.set_column_names(unique_names(&raw, clean_name, &[]))?;
                    TableIndex::Synthetic
                }
            }
            SnapshotKind::Quote | SnapshotKind::Rating => {
                let raw: Vec<String> =
                    df.get_column_names().iter().map(|n| n.to_string()).collect();
                df.set_column_names(unique_names(&raw, strip_ordinal, &[]))?;
                df = df.drop("index")?;
                if df.column("symbol").is_ok() {
                    TableIndex::Column("symbol".to_string())
                } else {
                    TableIndex::Synthetic
                }
            }
            SnapshotKind::Overview => TableIndex::Synthetic,
        };
        Ok(NormalizedTable::new(df, index, &ctx.name))
    }
}

impl ResponseShape for Snapshot {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let map = check_payload(expect_json(raw, &ctx.function)?, &ctx.function)?;

        if self.kind == SnapshotKind::Overview {
            return Ok(Some(Dataset::Table(self.flat(map, ctx)?)));
        }

        let (key, fields) = map
            .iter()
            .find_map(|(k, v)| v.as_object().map(|o| (k, o)))
            .ok_or_else(|| VantageError::MissingKey {
                function: ctx.function.clone(),
                key: "snapshot object".to_string(),
            })?;

        if fields.is_empty() {
            warn!(function = %ctx.function, name = %ctx.name, "Snapshot payload is empty");
            return Ok(None);
        }

        Ok(Some(Dataset::Table(self.nested(key, fields, ctx)?)))
    }
}
