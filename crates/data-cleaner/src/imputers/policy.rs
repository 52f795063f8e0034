//! Missing-value policy: decides how each column is filled.
//!
//! The decision depends only on the column, its kind and the run's
//! strategy. No column ever influences another's decision.

use super::StatisticalImputer;
use crate::classifier::ColumnKind;
use crate::config::CleaningStrategy;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the policy for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FillDecision {
    /// Rows with any missing cell are removed from the whole table.
    DropRows,
    /// Missing numeric cells take this value.
    Numeric(f64),
    /// Missing categorical cells take this value.
    Categorical(String),
}

impl fmt::Display for FillDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropRows => f.write_str("drop rows"),
            Self::Numeric(value) => write!(f, "{value:.4}"),
            Self::Categorical(value) => write!(f, "'{value}'"),
        }
    }
}

/// Per-column fill decision logic.
pub struct MissingValuePolicy;

impl MissingValuePolicy {
    /// Compute the fill decision for a column.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::EmptyColumn`](crate::CleaningError::EmptyColumn)
    /// when an imputation strategy needs a statistic and the column has no
    /// non-missing values.
    pub fn fill_value(
        series: &Series,
        kind: ColumnKind,
        strategy: CleaningStrategy,
    ) -> Result<FillDecision> {
        match (strategy, kind) {
            (CleaningStrategy::Drop, _) => Ok(FillDecision::DropRows),
            (_, ColumnKind::Categorical) => {
                StatisticalImputer::mode(series).map(FillDecision::Categorical)
            }
            (CleaningStrategy::Mean, ColumnKind::Numeric) => {
                StatisticalImputer::mean(series).map(FillDecision::Numeric)
            }
            (CleaningStrategy::Median, ColumnKind::Numeric) => {
                StatisticalImputer::median(series).map(FillDecision::Numeric)
            }
        }
    }
}
