//! Column naming and construction helpers shared by the shapes.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use vantage_core::{Result, VantageError};

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\w?\. ").expect("valid ordinal prefix pattern"));

/// Removes numbered prefixes such as `"1. "` or `"1a. "`.
pub(crate) fn strip_ordinal(name: &str) -> String {
    ORDINAL_PREFIX.replace_all(name, "").into_owned()
}

/// Simplifies a series column name: `"5. adjusted close"` becomes `"adj_close"`.
pub(crate) fn clean_name(name: &str) -> String {
    strip_ordinal(name)
        .replace(" amount", "")
        .replace("adjusted", "adj")
        .replace(' ', "_")
}

/// Applies `simplify` to every name, keeping the result unique.
///
/// A name that would collide with an earlier one or with `reserved` keeps its
/// raw form, then gains a numeric suffix if that is taken as well.
pub(crate) fn unique_names<S: AsRef<str>>(
    raw: &[S],
    simplify: impl Fn(&str) -> String,
    reserved: &[&str],
) -> Vec<String> {
    let mut taken: Vec<String> = reserved.iter().map(|r| (*r).to_string()).collect();
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        let name = name.as_ref();
        let mut candidate = simplify(name);
        if taken.contains(&candidate) {
            candidate = name.to_string();
        }
        let mut n = 1;
        let base = candidate.clone();
        while taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        taken.push(candidate.clone());
        names.push(candidate);
    }
    names
}

/// Cells that stand for a missing value.
pub(crate) fn is_null_token(value: &str) -> bool {
    matches!(value.trim(), "" | "None" | "null")
}

/// Renders a JSON scalar as text, mapping null tokens to `None`.
pub(crate) fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if is_null_token(s) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds a column that is `f64` when every present value is numeric, and a
/// string column otherwise.
pub(crate) fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    let parsed: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
        .collect();
    let numeric = values
        .iter()
        .zip(&parsed)
        .all(|(raw, num)| raw.is_none() || num.is_some());
    if numeric && values.iter().any(Option::is_some) {
        Column::new(name.into(), parsed)
    } else {
        string_column(name, values)
    }
}

/// Builds a string column.
pub(crate) fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Column::new(name.into(), values)
}

/// Builds an `f64` column, non-numeric text becoming null.
pub(crate) fn float_column(name: &str, values: &[Option<String>]) -> Column {
    let parsed: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.as_deref().and_then(|s| s.trim().trim_end_matches('%').parse().ok()))
        .collect();
    Column::new(name.into(), parsed)
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Builds a millisecond `Datetime` column.
pub(crate) fn datetime_column(name: &str, stamps: &[NaiveDateTime]) -> Result<Column> {
    let millis: Vec<i64> = stamps
        .iter()
        .map(|t| t.and_utc().timestamp_millis())
        .collect();
    Ok(Column::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Builds a `Date` column from ISO dates.
pub(crate) fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| VantageError::Other("invalid epoch".to_string()))?;
    let days: Vec<i32> = dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    Ok(Column::new(name.into(), days).cast(&DataType::Date)?)
}

/// Assembles a frame, mapping polars failures to parse errors.
pub(crate) fn frame(columns: Vec<Column>) -> Result<DataFrame> {
    Ok(DataFrame::new(columns)?)
}

/// Renames columns positionally when the counts match.
///
/// Returns `false` and leaves the frame untouched when they do not.
pub(crate) fn rename_all(df: &mut DataFrame, names: &[&str]) -> Result<bool> {
    if df.width() != names.len() {
        return Ok(false);
    }
    df.set_column_names(names.iter().copied())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("1. open"), "open");
        assert_eq!(clean_name("5. adjusted close"), "adj_close");
        assert_eq!(clean_name("7. dividend amount"), "dividend");
        assert_eq!(clean_name("8. split coefficient"), "split_coefficient");
        assert_eq!(clean_name("1a. open (USD)"), "open_(USD)");
        assert_eq!(strip_ordinal("01. symbol"), "symbol");
        assert_eq!(strip_ordinal("10. change percent"), "change percent");
    }

    #[test]
    fn test_unique_names_keep_raw_name_on_collision() {
        let raw = ["1a. open (USD)", "1b. open (USD)", "5. volume", "date"];
        assert_eq!(
            unique_names(&raw, clean_name, &["date"]),
            vec!["open_(USD)", "1b. open (USD)", "volume", "date_1"]
        );
        assert_eq!(unique_names(&["a", "a"], |n| n.to_string(), &[]), vec!["a", "a_1"]);
    }

    #[test]
    fn test_infer_column() {
        let numeric = infer_column("x", vec![Some("1.5".into()), None, Some("2".into())]);
        assert_eq!(numeric.dtype(), &DataType::Float64);
        assert_eq!(numeric.null_count(), 1);

        let text = infer_column("x", vec![Some("IBM".into()), Some("2".into())]);
        assert_eq!(text.dtype(), &DataType::String);

        let empty = infer_column("x", vec![None, None]);
        assert_eq!(empty.dtype(), &DataType::String);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("2024-01-02 16:00:00").is_some());
        assert!(parse_timestamp("2024-01-02 16:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-01-02").unwrap() < parse_timestamp("2024-01-02 09:35:00").unwrap());
    }

    #[test]
    fn test_null_tokens() {
        assert_eq!(json_text(&Value::String("None".into())), None);
        assert_eq!(json_text(&Value::String("12".into())), Some("12".to_string()));
        assert_eq!(json_text(&serde_json::json!(3)), Some("3".to_string()));
    }

    #[test]
    fn test_rename_all_requires_matching_width() {
        let mut df = frame(vec![Column::new("a".into(), vec![1i64])]).unwrap();
        assert!(!rename_all(&mut df, &["x", "y"]).unwrap());
        assert!(rename_all(&mut df, &["x"]).unwrap());
        assert_eq!(df.get_column_names()[0].as_str(), "x");
    }
}
