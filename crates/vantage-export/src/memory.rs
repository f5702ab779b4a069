//! In-memory sink.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

use vantage_core::{NormalizedTable, Result, TableSink, VantageError};

/// Records every write in order; mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<(String, NormalizedTable)>>,
}

impl MemorySink {
    /// Create a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stems written so far, oldest first.
    #[must_use]
    pub fn stems(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|w| w.iter().map(|(stem, _)| stem.clone()).collect())
            .unwrap_or_default()
    }

    /// The most recent table written under `stem`.
    #[must_use]
    pub fn get(&self, stem: &str) -> Option<NormalizedTable> {
        let writes = self.writes.lock().ok()?;
        writes
            .iter()
            .rev()
            .find(|(s, _)| s == stem)
            .map(|(_, t)| t.clone())
    }

    /// Number of writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or_default()
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn write(&self, stem: &str, table: &NormalizedTable) -> Result<()> {
        debug!(stem, rows = table.height(), "MemorySink: storing table");
        self.writes
            .lock()
            .map_err(|e| VantageError::Export(e.to_string()))?
            .push((stem.to_string(), table.clone()));
        Ok(())
    }
}
