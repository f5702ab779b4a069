//! Directory-backed sink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use vantage_core::{NormalizedTable, OutputFormat, Result, TableSink, VantageError};

use crate::writer::write_table;

/// Writes every table into a directory as `<stem>.<extension>`.
///
/// The directory is created on first write; existing files are overwritten.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Creates a sink writing `format` files into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Full path a stem is written to.
    #[must_use]
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.{}", self.format.extension()))
    }
}

#[async_trait]
impl TableSink for FileSink {
    #[instrument(skip(self, table), fields(dir = %self.dir.display(), format = %self.format))]
    async fn write(&self, stem: &str, table: &NormalizedTable) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| VantageError::Export(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(stem);
        write_table(table, &path, self.format)?;
        debug!(path = %path.display(), rows = table.height(), "Exported table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use vantage_core::TableIndex;

    #[tokio::test]
    async fn test_file_sink_creates_directory_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("av_data");
        let sink = FileSink::new(&dir, OutputFormat::Csv);

        let df = DataFrame::new(vec![Column::new("close".into(), vec![1.0f64, 2.0])]).unwrap();
        let table = NormalizedTable::new(df, TableIndex::Synthetic, "MSFT");
        sink.write("MSFT_D", &table).await.unwrap();
        sink.write("MSFT_D", &table).await.unwrap();

        let path = dir.join("MSFT_D.csv");
        assert_eq!(sink.path_for("MSFT_D"), path);
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
