//! Granularity, output size and reporting period definitions.
//!
//! The accepted interval values themselves live in the endpoint catalog; this
//! module only normalizes caller input before it is checked against those lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows requested for series endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// The latest 100 data points.
    #[default]
    Compact,
    /// The full available history.
    Full,
}

impl OutputSize {
    /// Wire value of the output size.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }

    /// Parses an output size leniently, falling back to [`OutputSize::Compact`].
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "full" => Self::Full,
            _ => Self::Compact,
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting frequency of a financial statement table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFrequency {
    /// Quarterly reports.
    Quarterly,
    /// Annual reports.
    Annually,
}

impl ReportFrequency {
    /// Tag used in exported file names.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Quarterly => "Quarterly",
            Self::Annually => "Annually",
        }
    }

    /// Payload key holding the reports of this frequency.
    #[must_use]
    pub const fn payload_key(&self) -> &'static str {
        match self {
            Self::Quarterly => "quarterlyReports",
            Self::Annually => "annualReports",
        }
    }
}

/// Normalizes an interval argument.
///
/// Bare minute counts such as `"5"` become `"5min"`; everything else is
/// lowercased and trimmed. The result still has to be checked against the
/// catalog's allow-list.
#[must_use]
pub fn normalize_interval(input: &str) -> String {
    let trimmed = input.trim().to_lowercase();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{trimmed}min")
    } else {
        trimmed
    }
}
