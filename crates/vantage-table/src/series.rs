//! Timestamp keyed series: equities, FX, crypto and technical indicators.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::debug;

use vantage_core::{Dataset, NormalizedTable, RawResponse, Result, TableIndex, VantageError};

use crate::calendar::read_csv;
use crate::columns::{
    clean_name, datetime_column, float_column, frame, json_text, parse_timestamp, unique_names,
};
use crate::shape::{ResponseShape, ShapeContext, check_payload, expect_text};

/// Name of the time index column.
pub const DATE_COLUMN: &str = "date";

/// A `date` column plus one `f64` column per field, oldest row first.
///
/// Rows are ordered by their parsed timestamp, not by payload order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeSeries;

impl TimeSeries {
    fn from_json(&self, map: &Map<String, Value>, ctx: &ShapeContext) -> Result<NormalizedTable> {
        let (key, series) = map
            .iter()
            .filter(|(k, _)| k.as_str() != "Meta Data")
            .find_map(|(k, v)| v.as_object().map(|o| (k, o)))
            .ok_or_else(|| VantageError::MissingKey {
                function: ctx.function.clone(),
                key: "time series".to_string(),
            })?;

        let mut rows: Vec<(NaiveDateTime, &Map<String, Value>)> = Vec::with_capacity(series.len());
        for (stamp, fields) in series {
            let at = parse_timestamp(stamp).ok_or_else(|| {
                VantageError::Parse(format!("{}: invalid timestamp {stamp:?}", ctx.function))
            })?;
            let fields = fields.as_object().ok_or_else(|| {
                VantageError::Parse(format!("{}: entry {stamp} is not an object", ctx.function))
            })?;
            rows.push((at, fields));
        }
        rows.sort_by_key(|(at, _)| *at);

        let mut names: Vec<&String> = Vec::new();
        for (_, fields) in &rows {
            for name in fields.keys() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        let stamps: Vec<NaiveDateTime> = rows.iter().map(|(at, _)| *at).collect();
        let mut columns = vec![datetime_column(DATE_COLUMN, &stamps)?];
        for (name, column) in names.iter().zip(self.column_names(&names, ctx)) {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|(_, fields)| fields.get(*name).and_then(json_text))
                .collect();
            columns.push(float_column(&column, &values));
        }

        debug!(function = %ctx.function, name = %ctx.name, key = %key, rows = stamps.len(), "Normalized time series");
        Ok(NormalizedTable::new(
            frame(columns)?,
            TableIndex::Column(DATE_COLUMN.to_string()),
            &ctx.name,
        ))
    }

    fn from_csv(&self, text: &str, ctx: &ShapeContext) -> Result<NormalizedTable> {
        let (headers, records) = read_csv(text, &ctx.function)?;
        if headers.is_empty() {
            return Err(VantageError::MissingKey {
                function: ctx.function.clone(),
                key: "header".to_string(),
            });
        }

        let mut rows: Vec<(NaiveDateTime, &Vec<Option<String>>)> = Vec::with_capacity(records.len());
        for record in &records {
            let stamp = record.first().cloned().flatten().unwrap_or_default();
            let at = parse_timestamp(&stamp).ok_or_else(|| {
                VantageError::Parse(format!("{}: invalid timestamp {stamp:?}", ctx.function))
            })?;
            rows.push((at, record));
        }
        rows.sort_by_key(|(at, _)| *at);

        let stamps: Vec<NaiveDateTime> = rows.iter().map(|(at, _)| *at).collect();
        let mut columns = vec![datetime_column(DATE_COLUMN, &stamps)?];
        let names = self.column_names(&headers[1..], ctx);
        for (idx, name) in names.iter().enumerate() {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|(_, record)| record.get(idx + 1).cloned().flatten())
                .collect();
            columns.push(float_column(name, &values));
        }

        Ok(NormalizedTable::new(
            frame(columns)?,
            TableIndex::Column(DATE_COLUMN.to_string()),
            &ctx.name,
        ))
    }

    fn column_names<S: AsRef<str>>(&self, raw: &[S], ctx: &ShapeContext) -> Vec<String> {
        let clean = ctx.clean;
        unique_names(
            raw,
            |name| if clean { clean_name(name) } else { name.to_string() },
            &[DATE_COLUMN],
        )
    }
}

impl ResponseShape for TimeSeries {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let table = match raw {
            RawResponse::Json(value) => self.from_json(check_payload(value, &ctx.function)?, ctx)?,
            RawResponse::Text(_) => self.from_csv(expect_text(raw, &ctx.function)?, ctx)?,
        };
        Ok(Some(Dataset::Table(table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use polars::prelude::*;
    use serde_json::json;

    fn daily_adjusted(days: usize) -> Value {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series = Map::new();
        // Newest first, the way the service sends it.
        for offset in (0..days).rev() {
            let date = start + Duration::days(offset as i64);
            series.insert(
                date.format("%Y-%m-%d").to_string(),
                json!({
                    "1. open": format!("{}.10", 300 + offset),
                    "2. high": "410.00",
                    "3. low": "395.50",
                    "4. close": "405.25",
                    "5. adjusted close": "405.25",
                    "6. volume": "21000000",
                    "7. dividend amount": "0.0000",
                    "8. split coefficient": "1.0"
                }),
            );
        }
        json!({
            "Meta Data": {"2. Symbol": "MSFT"},
            "Time Series (Daily)": series
        })
    }

    fn dates(table: &NormalizedTable) -> Vec<i64> {
        table
            .frame()
            .column(DATE_COLUMN)
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_daily_adjusted_hundred_rows_ascending() {
        let ctx = ShapeContext::new("TIME_SERIES_DAILY_ADJUSTED", "MSFT");
        let table = TimeSeries
            .normalize(&RawResponse::Json(daily_adjusted(100)), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();

        assert_eq!(table.height(), 100);
        assert_eq!(table.name(), "MSFT");
        assert_eq!(table.index(), &TableIndex::Column("date".to_string()));
        let stamps = dates(&table);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            table.frame().column(DATE_COLUMN).unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(table.frame().column("1. open").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_clean_series_columns() {
        let ctx = ShapeContext::new("TIME_SERIES_DAILY_ADJUSTED", "MSFT").with_clean(true);
        let table = TimeSeries
            .normalize(&RawResponse::Json(daily_adjusted(3)), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();
        assert_eq!(
            table.column_names(),
            vec!["date", "open", "high", "low", "close", "adj_close", "volume", "dividend", "split_coefficient"]
        );
    }

    #[test]
    fn test_intraday_sorted_by_parsed_time() {
        let payload = json!({
            "Meta Data": {},
            "Time Series (5min)": {
                "2024-03-01 09:35:00": {"1. open": "1", "4. close": "2"},
                "2024-03-01 16:00:00": {"1. open": "3", "4. close": "4"},
                "2024-02-29 16:00:00": {"1. open": "5", "4. close": "6"}
            }
        });
        let ctx = ShapeContext::new("TIME_SERIES_INTRADAY", "IBM");
        let table = TimeSeries
            .normalize(&RawResponse::Json(payload), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();
        let opens: Vec<f64> = table
            .frame()
            .column("1. open")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(opens, vec![5.0, 1.0, 3.0]);
    }

    #[test]
    fn test_indicator_series() {
        let payload = json!({
            "Meta Data": {"1: Symbol": "IBM", "2: Indicator": "Simple Moving Average (SMA)"},
            "Technical Analysis: SMA": {
                "2024-03-01": {"SMA": "180.1"},
                "2024-02-29": {"SMA": "179.8"}
            }
        });
        let ctx = ShapeContext::new("SMA", "IBM");
        let table = TimeSeries
            .normalize(&RawResponse::Json(payload), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.column_names(), vec!["date", "SMA"]);
    }

    #[test]
    fn test_csv_series() {
        let body = "timestamp,open,high,low,close,volume\n\
                    2024-03-01,182.45,184.21,181.76,183.54,4167522\n\
                    2024-02-29,181.00,183.00,180.00,182.21,3000000\n";
        let ctx = ShapeContext::new("TIME_SERIES_DAILY", "IBM");
        let table = TimeSeries
            .normalize(&RawResponse::Text(body.to_string()), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();
        assert_eq!(table.height(), 2);
        let stamps = dates(&table);
        assert!(stamps[0] < stamps[1]);
        assert_eq!(table.column_names()[1], "open");
    }

    #[test]
    fn test_digital_currency_clean_keeps_both_open_columns() {
        let fields = |open: &str| {
            json!({
                "1a. open (USD)": open,
                "1b. open (USD)": open,
                "5. volume": "1200.5",
                "6. market cap (USD)": "1200.5"
            })
        };
        let payload = json!({
            "Meta Data": {"2. Digital Currency Code": "BTC", "4. Market Code": "USD"},
            "Time Series (Digital Currency Daily)": {
                "2024-03-02": fields("62000.0"),
                "2024-03-01": fields("61000.0")
            }
        });
        let ctx = ShapeContext::new("DIGITAL_CURRENCY_DAILY", "BTC").with_clean(true);
        let table = TimeSeries
            .normalize(&RawResponse::Json(payload), &ctx)
            .unwrap()
            .and_then(Dataset::into_table)
            .unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(
            table.column_names(),
            vec!["date", "open_(USD)", "1b. open (USD)", "volume", "market_cap_(USD)"]
        );
        let opens: Vec<f64> = table
            .frame()
            .column("1b. open (USD)")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(opens, vec![61000.0, 62000.0]);
    }

    #[test]
    fn test_invalid_timestamp_is_parse_error() {
        let payload = json!({"Time Series (Daily)": {"not a date": {"1. open": "1"}}});
        let ctx = ShapeContext::new("TIME_SERIES_DAILY", "IBM");
        let err = TimeSeries
            .normalize(&RawResponse::Json(payload), &ctx)
            .unwrap_err();
        assert!(matches!(err, VantageError::Parse(_)));
    }
}
