//! Sink trait for exported tables.
//!
//! This module defines the [`TableSink`] trait that receives every normalized
//! table when export is enabled.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, table::NormalizedTable};

/// Destination for normalized tables.
///
/// Implementations decide where a table identified by `stem` ends up: files on
/// disk, memory, or nowhere at all.
#[async_trait]
pub trait TableSink: Send + Sync + Debug {
    /// Writes a table under the given file stem, replacing any previous one.
    async fn write(&self, stem: &str, table: &NormalizedTable) -> Result<()>;
}
