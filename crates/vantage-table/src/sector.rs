//! Sector performance rankings.

use serde_json::{Map, Value};

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::columns::{float_column, frame, json_text, string_column};
use crate::shape::{ResponseShape, ShapeContext, check_payload, expect_json};

/// Index column of sector tables.
pub const SECTOR_COLUMN: &str = "sector";

const RANK_PREFIX: &str = "Rank ";

/// Short names of the ranking horizons, in rank order.
const HORIZON_COLUMNS: &[&str] = &["rt", "1d", "5d", "1m", "3m", "ytd", "1y", "3y", "5y", "10y"];

/// One row per sector and one percentage column per ranking horizon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sector;

impl ResponseShape for Sector {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let map = check_payload(expect_json(raw, &ctx.function)?, &ctx.function)?;

        let mut ranks: Vec<(&String, &Map<String, Value>)> = map
            .iter()
            .filter(|(k, _)| k.starts_with(RANK_PREFIX))
            .filter_map(|(k, v)| v.as_object().map(|o| (k, o)))
            .collect();
        if ranks.is_empty() {
            return Err(VantageError::MissingKey {
                function: ctx.function.clone(),
                key: "Rank A: Real-Time Performance".to_string(),
            });
        }
        ranks.sort_by(|a, b| a.0.cmp(b.0));

        let mut sectors: Vec<&String> = Vec::new();
        for (_, rank) in &ranks {
            for sector in rank.keys() {
                if !sectors.contains(&sector) {
                    sectors.push(sector);
                }
            }
        }

        let short_names = ctx.clean && ranks.len() == HORIZON_COLUMNS.len();
        let mut columns = vec![string_column(
            SECTOR_COLUMN,
            sectors.iter().map(|s| Some((*s).clone())).collect(),
        )];
        for (pos, (key, rank)) in ranks.iter().enumerate() {
            let name = if short_names {
                HORIZON_COLUMNS[pos].to_string()
            } else if ctx.clean {
                key.split_once(": ").map_or(key.as_str(), |(_, rest)| rest).to_string()
            } else {
                (*key).clone()
            };
            let values: Vec<Option<String>> = sectors
                .iter()
                .map(|s| rank.get(*s).and_then(json_text))
                .collect();
            columns.push(float_column(&name, &values));
        }

        Ok(Some(Dataset::Table(NormalizedTable::new(
            frame(columns)?,
            TableIndex::Column(SECTOR_COLUMN.to_string()),
            &ctx.name,
        ))))
    }
}
