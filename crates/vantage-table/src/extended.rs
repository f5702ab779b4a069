//! Extended intraday history, delivered as CSV slices.

use chrono::NaiveDateTime;

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::calendar::read_csv;
use crate::columns::{
    clean_name, datetime_column, float_column, frame, parse_timestamp, unique_names,
};
use crate::shape::{ResponseShape, ShapeContext, expect_text};

const TIME_COLUMN: &str = "time";

/// Name of the index column of extended intraday tables.
pub const DATETIME_COLUMN: &str = "datetime";

/// The `time` column becomes a `datetime` index, oldest row first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtendedIntraday;

impl ResponseShape for ExtendedIntraday {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let text = expect_text(raw, &ctx.function)?;
        let (headers, records) = read_csv(text, &ctx.function)?;
        let time_idx = headers
            .iter()
            .position(|h| h == TIME_COLUMN)
            .ok_or_else(|| VantageError::MissingKey {
                function: ctx.function.clone(),
                key: TIME_COLUMN.to_string(),
            })?;

        let mut rows: Vec<(NaiveDateTime, &Vec<Option<String>>)> = Vec::with_capacity(records.len());
        for record in &records {
            let stamp = record.get(time_idx).cloned().flatten().unwrap_or_default();
            let at = parse_timestamp(&stamp).ok_or_else(|| {
                VantageError::Parse(format!("{}: invalid time {stamp:?}", ctx.function))
            })?;
            rows.push((at, record));
        }
        rows.sort_by_key(|(at, _)| *at);

        let stamps: Vec<NaiveDateTime> = rows.iter().map(|(at, _)| *at).collect();
        let mut columns = vec![datetime_column(DATETIME_COLUMN, &stamps)?];
        let fields: Vec<(usize, &String)> =
            headers.iter().enumerate().filter(|(i, _)| *i != time_idx).collect();
        let raw: Vec<&str> = fields.iter().map(|(_, h)| h.as_str()).collect();
        let clean = ctx.clean;
        let names = unique_names(
            &raw,
            |name| if clean { clean_name(name) } else { name.to_string() },
            &[DATETIME_COLUMN],
        );
        for ((idx, _), name) in fields.iter().zip(names) {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|(_, r)| r.get(*idx).cloned().flatten())
                .collect();
            columns.push(float_column(&name, &values));
        }

        Ok(Some(Dataset::Table(NormalizedTable::new(
            frame(columns)?,
            TableIndex::Column(DATETIME_COLUMN.to_string()),
            &ctx.name,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_intraday_reversed_to_ascending() {
        let body = "time,open,high,low,close,volume\r\n\
                    2024-03-01 16:00:00,183.5,183.6,183.4,183.54,120000\r\n\
                    2024-03-01 15:55:00,183.1,183.5,183.0,183.45,90000\r\n\
                    2024-03-01 15:50:00,183.0,183.2,182.9,183.10,80000\r\n";
        let raw = RawResponse::from_body(vantage_core::DataType::Csv, body.to_string()).unwrap();
        let ctx = ShapeContext::new("TIME_SERIES_INTRADAY_EXTENDED", "IBM");
        let table = ExtendedIntraday
            .normalize(&raw, &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();

        assert_eq!(table.height(), 3);
        assert_eq!(table.column_names(), vec!["datetime", "open", "high", "low", "close", "volume"]);
        let closes: Vec<f64> = table
            .frame()
            .column("close")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(closes, vec![183.10, 183.45, 183.54]);
    }

    #[test]
    fn test_missing_time_column() {
        let raw = RawResponse::Text("timestamp,open\n2024-03-01,1\n".to_string());
        let ctx = ShapeContext::new("TIME_SERIES_INTRADAY_EXTENDED", "IBM");
        assert!(matches!(
            ExtendedIntraday.normalize(&raw, &ctx).unwrap_err(),
            VantageError::MissingKey { .. }
        ));
    }

    #[test]
    fn test_extended_intraday_duplicate_clean_names() {
        let body = "time,1. open,2. open,datetime\n2024-03-01 16:00:00,1.0,2.0,3.0\n";
        let ctx = ShapeContext::new("TIME_SERIES_INTRADAY_EXTENDED", "IBM").with_clean(true);
        let table = ExtendedIntraday
            .normalize(&RawResponse::Text(body.to_string()), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();
        assert_eq!(table.column_names(), vec!["datetime", "open", "2. open", "datetime_1"]);
    }
}
