//! CSV calendars: earnings, IPOs and listing status.

use polars::prelude::*;

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::columns::{frame, infer_column, is_null_token, string_column};
use crate::shape::{ResponseShape, ShapeContext, expect_text};

/// Header names and rows of a CSV body, null tokens already mapped to `None`.
pub(crate) type CsvTable = (Vec<String>, Vec<Vec<Option<String>>>);

/// Reads a CSV body with the `csv` crate.
pub(crate) fn read_csv(text: &str, function: &str) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| VantageError::Parse(format!("{function}: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| VantageError::Parse(format!("{function}: {e}")))?;
        rows.push(
            record
                .iter()
                .map(|cell| (!is_null_token(cell)).then(|| cell.to_string()))
                .collect(),
        );
    }
    Ok((headers, rows))
}

/// Builds the columns of a CSV table, keeping `text_column` as text.
pub(crate) fn csv_columns(headers: &[String], rows: &[Vec<Option<String>>], text_column: &str) -> Vec<Column> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Option<String>> =
                rows.iter().map(|r| r.get(idx).cloned().flatten()).collect();
            if name == text_column {
                string_column(name, values)
            } else {
                infer_column(name, values)
            }
        })
        .collect()
}

/// Parsed CSV indexed and sorted by the caller's column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calendar;

impl ResponseShape for Calendar {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let text = expect_text(raw, &ctx.function)?;
        let (headers, rows) = read_csv(text, &ctx.function)?;

        let index = ctx.order.index.as_str();
        if !headers.iter().any(|h| h == index) {
            return Err(VantageError::InvalidParameter(format!(
                "{} has no column {index:?} to index by; columns are {}",
                ctx.function,
                headers.join(", ")
            )));
        }

        let df = frame(csv_columns(&headers, &rows, index))?
            .lazy()
            .sort(
                [index],
                SortMultipleOptions::default()
                    .with_order_descending(!ctx.order.ascending)
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            )
            .collect()?;

        Ok(Some(Dataset::Table(NormalizedTable::new(
            df,
            TableIndex::Column(index.to_string()),
            &ctx.name,
        ))))
    }
}
