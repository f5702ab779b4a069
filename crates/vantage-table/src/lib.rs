#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Response normalization.
//!
//! - [`shape_for`] - Picks the [`Shape`] of a function
//! - [`normalize`] - Runs the shape on a raw response
//! - [`check_payload`] - Error, notice and missing-data detection

/// CSV calendars and listings.
pub mod calendar;
mod columns;
/// Extended intraday slices.
pub mod extended;
/// Symbol search matches.
pub mod search;
/// Sector performance rankings.
pub mod sector;
/// Timestamp keyed series.
pub mod series;
/// Shape selection and payload pre-checks.
pub mod shape;
/// One-row tables.
pub mod snapshot;
/// Financial statements.
pub mod statement;

pub use calendar::Calendar;
pub use extended::ExtendedIntraday;
pub use search::Search;
pub use sector::Sector;
pub use series::TimeSeries;
pub use shape::{
    CalendarOrder, ResponseShape, Shape, ShapeContext, check_payload, normalize, shape_for,
};
pub use snapshot::{Snapshot, SnapshotKind};
pub use statement::Statement;
