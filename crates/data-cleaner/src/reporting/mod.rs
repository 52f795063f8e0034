//! Cleaning report types and writer.
//!
//! A [`CleaningReport`] is produced by every successful run. It records
//! what was changed and every failure the engine absorbed, so a caller
//! never mistakes a partially normalized table for a fully normalized one.

mod generator;

pub use generator::ReportGenerator;

use crate::classifier::ColumnKind;
use crate::config::CleaningStrategy;
use serde::{Deserialize, Serialize};

/// Summary of a single cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Strategy applied to the run.
    pub strategy: CleaningStrategy,
    /// RFC 3339 timestamp of when the run finished.
    pub generated_at: String,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows removed by the Drop strategy.
    pub rows_dropped: usize,

    /// Fraction of non-missing cells before cleaning (0.0 - 1.0).
    pub completeness_before: f32,
    /// Fraction of non-missing cells after cleaning (0.0 - 1.0).
    pub completeness_after: f32,

    /// Name of the normalizer used, if normalization ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<String>,

    /// Per-column outcome, in table order.
    pub columns: Vec<ColumnReport>,
    /// Ordered log of what the engine did.
    pub actions: Vec<CleaningAction>,
    /// Absorbed failures and notes.
    pub warnings: Vec<String>,
}

impl CleaningReport {
    /// Create an empty report for a run with the given strategy.
    pub fn new(strategy: CleaningStrategy) -> Self {
        Self {
            strategy,
            generated_at: String::new(),
            duration_ms: 0,
            rows_before: 0,
            rows_after: 0,
            rows_dropped: 0,
            completeness_before: 0.0,
            completeness_after: 0.0,
            normalizer: None,
            columns: Vec::new(),
            actions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_column(&mut self, column: ColumnReport) {
        self.columns.push(column);
    }

    /// Look up the report entry for a column.
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of columns whose values changed.
    pub fn modified_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_modified())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Names of columns left untouched because no fill value existed.
    pub fn skipped_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.skipped_reason.is_some())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn cells_filled(&self) -> usize {
        self.columns.iter().map(|c| c.cells_filled).sum()
    }

    pub fn cells_normalized(&self) -> usize {
        self.columns.iter().map(|c| c.cells_normalized).sum()
    }

    pub fn normalization_failures(&self) -> usize {
        self.columns.iter().map(|c| c.normalization_failures).sum()
    }

    /// Whether any per-cell or per-column failure was absorbed.
    pub fn has_partial_failures(&self) -> bool {
        self.normalization_failures() > 0 || !self.skipped_columns().is_empty()
    }
}

/// Outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_before: usize,
    pub missing_after: usize,
    /// Fill value used, formatted for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<String>,
    pub cells_filled: usize,
    /// Normalization calls made for this column.
    pub normalization_attempts: usize,
    /// Calls that succeeded (the value may or may not have changed).
    pub cells_normalized: usize,
    /// Calls that succeeded and changed the value.
    pub cells_changed: usize,
    pub normalization_failures: usize,
    /// Why the column was left unmodified, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    /// Input dtype, set when cleaning rewrote the column as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_from: Option<String>,
}

impl ColumnReport {
    pub fn new(name: impl Into<String>, kind: ColumnKind, missing_before: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            missing_before,
            missing_after: missing_before,
            fill_value: None,
            cells_filled: 0,
            normalization_attempts: 0,
            cells_normalized: 0,
            cells_changed: 0,
            normalization_failures: 0,
            skipped_reason: None,
            converted_from: None,
        }
    }

    /// Mark the column as skipped with a reason.
    pub fn mark_skipped(mut self, reason: impl Into<String>) -> Self {
        self.skipped_reason = Some(reason.into());
        self
    }

    pub fn is_modified(&self) -> bool {
        self.cells_filled > 0 || self.cells_changed > 0
    }
}

/// A single step taken during cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name or "dataset".
    pub target: String,
    pub description: String,
}

impl CleaningAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Types of actions recorded during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Rows with missing cells were removed.
    RowsDropped,
    /// Missing values were imputed.
    ValuesImputed,
    /// Categorical values were passed through the normalizer.
    ValuesNormalized,
    /// A column was left unmodified.
    ColumnSkipped,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RowsDropped => "Rows Dropped",
            Self::ValuesImputed => "Values Imputed",
            Self::ValuesNormalized => "Values Normalized",
            Self::ColumnSkipped => "Column Skipped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CleaningReport {
        let mut report = CleaningReport::new(CleaningStrategy::Mean);

        let mut age = ColumnReport::new("age", ColumnKind::Numeric, 1);
        age.cells_filled = 1;
        age.missing_after = 0;
        report.add_column(age);

        let mut city = ColumnReport::new("city", ColumnKind::Categorical, 1);
        city.cells_filled = 1;
        city.missing_after = 0;
        city.normalization_attempts = 3;
        city.cells_normalized = 2;
        city.normalization_failures = 1;
        report.add_column(city);

        report.add_column(
            ColumnReport::new("notes", ColumnKind::Categorical, 3).mark_skipped("no values"),
        );
        report
    }

    #[test]
    fn test_report_totals() {
        let report = sample_report();
        assert_eq!(report.cells_filled(), 2);
        assert_eq!(report.cells_normalized(), 2);
        assert_eq!(report.normalization_failures(), 1);
        assert!(report.has_partial_failures());
    }

    #[test]
    fn test_modified_and_skipped_columns() {
        let report = sample_report();
        assert_eq!(report.modified_columns(), vec!["age", "city"]);
        assert_eq!(report.skipped_columns(), vec!["notes"]);
        assert_eq!(report.column("notes").unwrap().missing_after, 3);
    }

    #[test]
    fn test_action_type_display_name() {
        assert_eq!(ActionType::RowsDropped.display_name(), "Rows Dropped");
        assert_eq!(ActionType::ColumnSkipped.display_name(), "Column Skipped");
    }

    #[test]
    fn test_report_json_roundtrip() {
        let mut report = sample_report();
        report.add_action(CleaningAction::new(
            ActionType::ValuesImputed,
            "age",
            "Filled 1 cell with mean",
        ));

        let json = serde_json::to_string(&report).expect("Should serialize");
        assert!(json.contains("\"strategy\":\"mean\""));
        assert!(json.contains("\"values_imputed\""));

        let back: CleaningReport = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, report);
    }
}
