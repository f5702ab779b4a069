//! Normalized table types.
//!
//! - [`NormalizedTable`] - A data frame plus its index column and display name
//! - [`StatementPair`] - Quarterly and annual statement tables
//! - [`Dataset`] - What a single call produces

use polars::prelude::DataFrame;

use crate::frequency::ReportFrequency;

/// Which column, if any, indexes the rows of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableIndex {
    /// Rows are identified by position only.
    Synthetic,
    /// Rows are identified by the named column.
    Column(String),
}

impl TableIndex {
    /// Returns the index column name, if any.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Synthetic => None,
            Self::Column(name) => Some(name),
        }
    }
}

/// A response converted into a table.
#[derive(Clone, Debug)]
pub struct NormalizedTable {
    frame: DataFrame,
    index: TableIndex,
    name: String,
}

impl NormalizedTable {
    /// Wraps a data frame.
    #[must_use]
    pub fn new(frame: DataFrame, index: TableIndex, name: impl Into<String>) -> Self {
        Self {
            frame,
            index,
            name: name.into(),
        }
    }

    /// The table contents.
    #[must_use]
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consumes the table, returning its data frame.
    #[must_use]
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// The index of the table.
    #[must_use]
    pub const fn index(&self) -> &TableIndex {
        &self.index
    }

    /// Display name, usually the symbol or currency pair queried.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect()
    }
}

/// Quarterly and annual reports of one financial statement.
#[derive(Clone, Debug)]
pub struct StatementPair {
    /// Quarterly reports, indexed by fiscal period end.
    pub quarterly: NormalizedTable,
    /// Annual reports, indexed by fiscal period end.
    pub annual: NormalizedTable,
}

impl StatementPair {
    /// Returns the table of the given frequency.
    #[must_use]
    pub const fn get(&self, frequency: ReportFrequency) -> &NormalizedTable {
        match frequency {
            ReportFrequency::Quarterly => &self.quarterly,
            ReportFrequency::Annually => &self.annual,
        }
    }
}

/// Result of a successful call.
#[derive(Clone, Debug)]
pub enum Dataset {
    /// A single table.
    Table(NormalizedTable),
    /// A statement with quarterly and annual tables.
    Statements(StatementPair),
}

impl Dataset {
    /// Returns the single table, if this is one.
    #[must_use]
    pub const fn as_table(&self) -> Option<&NormalizedTable> {
        match self {
            Self::Table(t) => Some(t),
            Self::Statements(_) => None,
        }
    }

    /// Returns the statement pair, if this is one.
    #[must_use]
    pub const fn as_statements(&self) -> Option<&StatementPair> {
        match self {
            Self::Statements(s) => Some(s),
            Self::Table(_) => None,
        }
    }

    /// Consumes the dataset, returning the single table.
    #[must_use]
    pub fn into_table(self) -> Option<NormalizedTable> {
        match self {
            Self::Table(t) => Some(t),
            Self::Statements(_) => None,
        }
    }

    /// Consumes the dataset, returning the statement pair.
    #[must_use]
    pub fn into_statements(self) -> Option<StatementPair> {
        match self {
            Self::Statements(s) => Some(s),
            Self::Table(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn table(name: &str, rows: usize) -> NormalizedTable {
        let df = DataFrame::new(vec![Column::new("value".into(), vec![1.0f64; rows])]).unwrap();
        NormalizedTable::new(df, TableIndex::Synthetic, name)
    }

    #[test]
    fn test_table_accessors() {
        let t = table("MSFT", 3);
        assert_eq!(t.name(), "MSFT");
        assert_eq!(t.height(), 3);
        assert_eq!(t.column_names(), vec!["value".to_string()]);
        assert_eq!(t.index().column(), None);
    }

    #[test]
    fn test_dataset_variants() {
        let pair = StatementPair {
            quarterly: table("IBM", 8),
            annual: table("IBM", 2),
        };
        let dataset = Dataset::Statements(pair);
        assert!(dataset.as_table().is_none());
        let pair = dataset.into_statements().unwrap();
        assert_eq!(pair.get(ReportFrequency::Quarterly).height(), 8);
        assert_eq!(pair.get(ReportFrequency::Annually).height(), 2);
    }
}
