//! No-op sink.

use async_trait::async_trait;
use tracing::trace;

use vantage_core::{NormalizedTable, Result, TableSink};

/// A sink that discards every table.
///
/// Used when export is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NoopSink {
    /// Create a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TableSink for NoopSink {
    async fn write(&self, stem: &str, _table: &NormalizedTable) -> Result<()> {
        trace!(stem, "NoopSink: write called, doing nothing");
        Ok(())
    }
}
