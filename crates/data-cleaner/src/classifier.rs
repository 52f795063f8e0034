//! Column classification.
//!
//! Labels every column of a table as numeric or categorical from its native
//! polars dtype. A column without any non-missing value is always
//! categorical so that no mean or median is attempted on it.

use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Kind of a column for imputation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// Everything else (strings, booleans, dates, all-missing columns)
    Categorical,
}

impl ColumnKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ordered mapping from column name to [`ColumnKind`], in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnKinds {
    entries: Vec<(String, ColumnKind)>,
}

impl ColumnKinds {
    /// Build a mapping from `(name, kind)` pairs, keeping their order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnKind)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }

    /// Kind of the named column, if present.
    pub fn get(&self, name: &str) -> Option<ColumnKind> {
        self.entries
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, kind)| *kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether at least one column is categorical.
    pub fn has_categorical(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, kind)| *kind == ColumnKind::Categorical)
    }

    /// Number of columns of the given kind.
    pub fn count(&self, kind: ColumnKind) -> usize {
        self.entries.iter().filter(|(_, k)| *k == kind).count()
    }
}

/// Classifies table columns as numeric or categorical.
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Classify every column of the table, in column order.
    pub fn classify(df: &DataFrame) -> ColumnKinds {
        let kinds = ColumnKinds::from_pairs(df.get_columns().iter().map(|column| {
            let kind = Self::classify_column(column.as_materialized_series());
            debug!("Column '{}' ({}) classified as {}", column.name(), column.dtype(), kind);
            (column.name().to_string(), kind)
        }));

        debug!(
            "Classified {} columns: {} numeric, {} categorical",
            kinds.len(),
            kinds.count(ColumnKind::Numeric),
            kinds.count(ColumnKind::Categorical)
        );
        kinds
    }

    /// Classify a single series.
    pub fn classify_column(series: &Series) -> ColumnKind {
        let has_values = series.null_count() < series.len();
        if has_values && is_numeric_dtype(series.dtype()) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}
