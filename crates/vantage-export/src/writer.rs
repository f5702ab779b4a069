//! Table writers, one per output format.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use vantage_core::{NormalizedTable, OutputFormat, Result, VantageError};

fn export_err(path: &Path, e: impl std::fmt::Display) -> VantageError {
    VantageError::Export(format!("{}: {e}", path.display()))
}

/// Writes a table to `path` in the given format, replacing any existing file.
///
/// # Errors
/// Returns [`VantageError::Export`] if the file cannot be created or written.
pub fn write_table(table: &NormalizedTable, path: &Path, format: OutputFormat) -> Result<()> {
    let mut df = table.frame().clone();
    match format {
        OutputFormat::Csv => {
            let mut file = File::create(path).map_err(|e| export_err(path, e))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| export_err(path, e))?;
        }
        OutputFormat::Json => {
            let mut file = File::create(path).map_err(|e| export_err(path, e))?;
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(&mut df)
                .map_err(|e| export_err(path, e))?;
        }
        OutputFormat::Parquet => {
            let mut file = File::create(path).map_err(|e| export_err(path, e))?;
            ParquetWriter::new(&mut file)
                .finish(&mut df)
                .map_err(|e| export_err(path, e))?;
        }
        OutputFormat::Html => {
            std::fs::write(path, render_html(table)).map_err(|e| export_err(path, e))?;
        }
        OutputFormat::Txt => {
            std::fs::write(path, format!("{df}\n")).map_err(|e| export_err(path, e))?;
        }
    }
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn cell(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => escape(s),
        other => escape(&other.to_string()),
    }
}

/// Renders a table as a bordered HTML table with its name as caption.
#[must_use]
pub fn render_html(table: &NormalizedTable) -> String {
    let df = table.frame();
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n");
    html.push_str(&format!("  <caption>{}</caption>\n", escape(table.name())));
    html.push_str("  <thead>\n    <tr>");
    for name in df.get_column_names() {
        html.push_str(&format!("<th>{}</th>", escape(name)));
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in 0..df.height() {
        html.push_str("    <tr>");
        for column in df.get_columns() {
            let value = column.get(row).map(cell).unwrap_or_default();
            html.push_str(&format!("<td>{value}</td>"));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::TableIndex;

    fn table() -> NormalizedTable {
        let df = DataFrame::new(vec![
            Column::new("symbol".into(), vec!["IBM", "A&B"]),
            Column::new("close".into(), vec![Some(183.54f64), None]),
        ])
        .unwrap();
        NormalizedTable::new(df, TableIndex::Column("symbol".into()), "IBM")
    }

    #[test]
    fn test_html_rendering() {
        let html = render_html(&table());
        assert!(html.contains("<th>symbol</th><th>close</th>"));
        assert!(html.contains("<td>A&amp;B</td><td></td>"));
        assert!(html.contains("  <caption>IBM</caption>\n  <thead>"));
    }

    #[test]
    fn test_csv_and_parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = table();

        let csv_path = dir.path().join("IBM.csv");
        write_table(&original, &csv_path, OutputFormat::Csv).unwrap();
        let back = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(csv_path))
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(back.height(), original.height());
        assert_eq!(back.get_column_names(), original.frame().get_column_names());

        let pq_path = dir.path().join("IBM.parquet");
        write_table(&original, &pq_path, OutputFormat::Parquet).unwrap();
        let back = ParquetReader::new(File::open(&pq_path).unwrap()).finish().unwrap();
        assert_eq!(back.height(), original.height());
        assert_eq!(back.get_column_names(), original.frame().get_column_names());
    }

    #[test]
    fn test_txt_and_json_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("IBM.txt");
        write_table(&table(), &txt, OutputFormat::Txt).unwrap();
        assert!(std::fs::read_to_string(&txt).unwrap().contains("symbol"));

        let json = dir.path().join("IBM.json");
        write_table(&table(), &json, OutputFormat::Json).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().contains("183.54"));
    }
}
