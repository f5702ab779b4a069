#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the Alpha Vantage client.
//!
//! This crate provides the pieces every other crate in the workspace builds on:
//!
//! - [`Catalog`](catalog::Catalog) - Known functions, aliases and parameter lists
//! - [`ClientConfig`](config::ClientConfig) - Client configuration
//! - [`RequestParameters`](params::RequestParameters) - Query parameters of a call
//! - [`NormalizedTable`](table::NormalizedTable) - A response converted into a table
//! - [`ApiTransport`](transport::ApiTransport) - Network abstraction
//! - [`TableSink`](sink::TableSink) - Export abstraction

/// Endpoint catalog.
pub mod catalog;
/// Client configuration.
pub mod config;
/// Error types for client operations.
pub mod error;
/// Output size, interval and reporting period definitions.
pub mod frequency;
/// Request parameters and option validation.
pub mod params;
/// Sink trait for exported tables.
pub mod sink;
/// Normalized table types.
pub mod table;
/// Transport trait.
pub mod transport;
/// Core data types (Symbol, DataType, RawResponse).
pub mod types;

// Re-export commonly used items at crate root
pub use catalog::{Catalog, EndpointDescriptor};
pub use config::{ClientConfig, OutputFormat};
pub use error::{Result, VantageError};
pub use frequency::{OutputSize, ReportFrequency, normalize_interval};
pub use params::{Options, ParamValue, RequestParameters, options, validate_option};
pub use sink::TableSink;
pub use table::{Dataset, NormalizedTable, StatementPair, TableIndex};
pub use transport::ApiTransport;
pub use types::{DataType, RawResponse, Symbol};
