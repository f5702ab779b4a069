#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Export sinks for normalized tables.
//!
//! This crate provides implementations of the [`TableSink`] trait from `vantage-core`:
//!
//! - [`FileSink`] - Writes files into a directory
//! - [`MemorySink`] - Keeps writes in memory for testing
//! - [`NoopSink`] - Discards everything, used when export is disabled
//!
//! [`export_stem`] names the file of a table after the call that produced it.

/// Directory-backed sink.
pub mod file;
/// In-memory sink.
pub mod memory;
/// No-op sink.
pub mod noop;
/// File names of exported tables.
pub mod path;
/// Table writers.
pub mod writer;

// Re-export the trait for convenience
pub use vantage_core::{OutputFormat, TableSink};

pub use file::FileSink;
pub use memory::MemorySink;
pub use noop::NoopSink;
pub use path::{ExportRequest, export_stem};
pub use writer::{render_html, write_table};
