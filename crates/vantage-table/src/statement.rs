//! Financial statements: income statement, balance sheet and cash flow.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use vantage_core::{
    Dataset, NormalizedTable, RawResponse, ReportFrequency, Result, StatementPair, TableIndex,
    VantageError,
};

use crate::columns::{date_column, frame, infer_column, json_text};
use crate::shape::{ResponseShape, ShapeContext, check_payload, expect_json};

/// Column holding the fiscal period end of each report.
pub const FISCAL_DATE_COLUMN: &str = "fiscalDateEnding";

/// Quarterly and annual tables indexed by fiscal period end, oldest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statement;

impl Statement {
    fn reports(
        &self,
        map: &Map<String, Value>,
        frequency: ReportFrequency,
        ctx: &ShapeContext,
    ) -> Result<NormalizedTable> {
        let key = frequency.payload_key();
        let reports = map
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| VantageError::MissingKey {
                function: ctx.function.clone(),
                key: key.to_string(),
            })?;

        let mut rows: Vec<(NaiveDate, &Map<String, Value>)> = Vec::with_capacity(reports.len());
        for report in reports.iter().filter_map(Value::as_object) {
            let raw_date = report
                .get(FISCAL_DATE_COLUMN)
                .and_then(Value::as_str)
                .unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                VantageError::Parse(format!("{}: invalid {FISCAL_DATE_COLUMN} {raw_date:?}: {e}", ctx.function))
            })?;
            rows.push((date, report));
        }
        rows.sort_by_key(|(date, _)| *date);

        let mut names: Vec<&String> = Vec::new();
        for (_, report) in &rows {
            for name in report.keys() {
                if name != FISCAL_DATE_COLUMN && !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        let mut columns = vec![date_column(FISCAL_DATE_COLUMN, &dates)?];
        for name in names {
            let values = rows
                .iter()
                .map(|(_, report)| report.get(name).and_then(json_text))
                .collect();
            columns.push(infer_column(name, values));
        }

        Ok(NormalizedTable::new(
            frame(columns)?,
            TableIndex::Column(FISCAL_DATE_COLUMN.to_string()),
            &ctx.name,
        ))
    }
}

impl ResponseShape for Statement {
    fn normalize(&self, raw: &RawResponse, ctx: &ShapeContext) -> Result<Option<Dataset>> {
        let map = check_payload(expect_json(raw, &ctx.function)?, &ctx.function)?;
        let quarterly = self.reports(map, ReportFrequency::Quarterly, ctx)?;
        let annual = self.reports(map, ReportFrequency::Annually, ctx)?;
        Ok(Some(Dataset::Statements(StatementPair { quarterly, annual })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use serde_json::json;

    fn report(date: &str, revenue: &str) -> Value {
        json!({
            "fiscalDateEnding": date,
            "reportedCurrency": "USD",
            "totalRevenue": revenue,
            "researchAndDevelopment": "None"
        })
    }

    fn payload() -> Value {
        json!({
            "symbol": "IBM",
            "annualReports": [report("2023-12-31", "61860000000"), report("2022-12-31", "60530000000")],
            "quarterlyReports": [
                report("2023-12-31", "17381000000"),
                report("2023-09-30", "14752000000"),
                report("2023-06-30", "15475000000"),
                report("2023-03-31", "14252000000"),
                report("2022-12-31", "16690000000")
            ]
        })
    }

    #[test]
    fn test_statement_pair() {
        let ctx = ShapeContext::new("INCOME_STATEMENT", "IBM");
        let pair = Statement
            .normalize(&RawResponse::Json(payload()), &ctx)
            .unwrap()
            .and_then(Dataset::into_statements)
            .unwrap();

        assert_eq!(pair.quarterly.height(), 5);
        assert_eq!(pair.annual.height(), 2);
        assert!(pair.quarterly.height() > pair.annual.height());
        assert_eq!(
            pair.annual.index(),
            &TableIndex::Column(FISCAL_DATE_COLUMN.to_string())
        );

        let column = pair.quarterly.frame().column(FISCAL_DATE_COLUMN).unwrap();
        assert_eq!(column.dtype(), &DataType::Date);
        let days: Vec<i32> = column
            .cast(&DataType::Int32)
            .unwrap()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(days.windows(2).all(|w| w[0] < w[1]));

        let revenue = pair.quarterly.frame().column("totalRevenue").unwrap();
        assert_eq!(revenue.dtype(), &DataType::Float64);
        let rnd = pair.quarterly.frame().column("researchAndDevelopment").unwrap();
        assert_eq!(rnd.null_count(), 5);
    }

    #[test]
    fn test_missing_reports() {
        let ctx = ShapeContext::new("BALANCE_SHEET", "IBM");
        let err = Statement
            .normalize(&RawResponse::Json(json!({"symbol": "IBM", "annualReports": []})), &ctx)
            .unwrap_err();
        assert!(matches!(err, VantageError::MissingKey { ref key, .. } if key == "quarterlyReports"));
    }
}
