#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage client returning polars tables.
//!
//! This crate ties the workspace together: [`AlphaVantage`] builds requests
//! from the endpoint catalog, sends them through an [`ApiTransport`],
//! normalizes the responses and hands them to a [`TableSink`] when export is
//! enabled.
//!
//! # Features
//!
//! - `http` - the `reqwest` based [`HttpTransport`] and [`AlphaVantage::new`]
//!
//! # Example
//!
//! ```rust,ignore
//! use vantage::{AlphaVantage, CalendarOrder, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> vantage::Result<()> {
//!     let av = AlphaVantage::new(ClientConfig::from_env()?.with_clean(true))?;
//!
//!     let ipos = av.ipos(CalendarOrder::by("ipoDate")).await?;
//!     let batch = av.data_batch(&["msft", "aapl"], "D", &vantage::Options::new()).await?;
//!     println!("{:?} {}", ipos, batch.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod endpoints;
pub mod history;

pub use client::AlphaVantage;
pub use history::CallLog;

// Core types and traits
pub use vantage_core::*;

// Normalizer
pub use vantage_table::{CalendarOrder, ResponseShape, Shape, ShapeContext, normalize};

// Export
pub use vantage_export::{FileSink, MemorySink, NoopSink, export_stem};

// Transport
#[cfg(feature = "http")]
pub use vantage_http::HttpTransport;
