//! Per-column decisions computed at the start of a run.

use crate::classifier::ColumnKind;
use crate::config::CleaningStrategy;
use crate::error::{CleaningError, Result};
use crate::imputers::{FillDecision, MissingValuePolicy};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What the engine will do with one column. Derived fresh for every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlan {
    pub name: String,
    pub kind: ColumnKind,
    /// Missing cells in the input column.
    pub missing: usize,
    /// Fill decision, or `None` when the column is left unmodified.
    pub fill: Option<FillDecision>,
    /// Why no fill decision exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    /// Whether the column's values go through the normalizer.
    pub normalize: bool,
}

impl ColumnPlan {
    /// Decide how to treat `series`.
    ///
    /// An empty column is not an error here: it yields a plan with no fill
    /// and a skip reason. Other failures propagate.
    pub fn for_column(
        series: &Series,
        kind: ColumnKind,
        strategy: CleaningStrategy,
        normalization_enabled: bool,
    ) -> Result<Self> {
        let (fill, skipped_reason) = match MissingValuePolicy::fill_value(series, kind, strategy) {
            Ok(fill) => (Some(fill), None),
            Err(CleaningError::EmptyColumn(_)) => {
                (None, Some("no non-missing values to derive a fill value from".to_string()))
            }
            Err(e) => return Err(e),
        };

        let normalize = normalization_enabled
            && strategy.is_imputation()
            && kind == ColumnKind::Categorical
            && fill.is_some();

        Ok(Self {
            name: series.name().to_string(),
            kind,
            missing: series.null_count(),
            fill,
            skipped_reason,
            normalize,
        })
    }

    pub fn is_skipped(&self) -> bool {
        self.fill.is_none()
    }
}
