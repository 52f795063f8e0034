//! The cleaning engine and its builder.
//!
//! [`CleaningEngine`] ties classification, the missing-value policy and
//! categorical normalization together and produces a cleaned table plus a
//! [`CleaningReport`].

use super::normalize::NormalizationRunner;
use super::plan::ColumnPlan;
use super::progress::{
    CancellationToken, CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::classifier::{ColumnClassifier, ColumnKind, ColumnKinds};
use crate::config::{CleaningConfig, CleaningStrategy, ConfigValidationError, NormalizationScope};
use crate::error::{CleaningError, Result, ResultExt};
use crate::imputers::{FillDecision, StatisticalImputer};
use crate::normalizer::TextNormalizer;
use crate::reporting::{ActionType, CleaningAction, CleaningReport, ColumnReport};
use crate::utils::{completeness, null_positions, string_values};
use polars::prelude::*;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Cleaned table plus the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: DataFrame,
    pub report: CleaningReport,
}

/// Fills missing values and normalizes categorical columns.
///
/// Use [`CleaningEngine::builder()`] to create an engine. An engine holds no
/// per-run state and can clean any number of tables.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::{CleaningEngine, CleaningStrategy, DictionaryNormalizer};
/// use std::sync::Arc;
///
/// let normalizer = Arc::new(DictionaryNormalizer::new().with_alias("nyc", "New York"));
///
/// let outcome = CleaningEngine::builder()
///     .normalizer(normalizer)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .clean(&df, CleaningStrategy::Mean)?;
///
/// println!("{} cells filled", outcome.report.cells_filled());
/// ```
pub struct CleaningEngine {
    config: CleaningConfig,
    normalizer: Option<Arc<dyn TextNormalizer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
}

static_assertions::assert_impl_all!(CleaningEngine: Send, Sync);

impl CleaningEngine {
    /// Create a new engine builder.
    pub fn builder() -> CleaningEngineBuilder {
        CleaningEngineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Name of the normalizer that will run, if any.
    pub fn active_normalizer(&self) -> Option<&str> {
        self.normalizer().map(|n| n.name())
    }

    /// Clean a table with the given strategy.
    ///
    /// The input is never modified. Every column of the output carries the
    /// same name and position as in the input.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::Cancelled`] if the cancellation token fired;
    /// no partial table is returned in that case. Empty columns and failed
    /// normalization calls do not fail the run; they are recorded in the
    /// report instead.
    pub fn clean(&self, df: &DataFrame, strategy: CleaningStrategy) -> Result<CleaningOutcome> {
        match self.clean_internal(df, strategy) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Cleaning error: {}", e);
                Err(e)
            }
        }
    }

    /// Clean a table with a strategy given by name (`drop`, `mean`, `median`).
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::InvalidStrategy`] for any other name, before
    /// any work is done.
    pub fn clean_named(&self, df: &DataFrame, strategy: &str) -> Result<CleaningOutcome> {
        let strategy = CleaningStrategy::from_str(strategy)?;
        self.clean(df, strategy)
    }

    /// Compute the per-column plan for a run without touching the table.
    pub fn plan(&self, df: &DataFrame, strategy: CleaningStrategy) -> Result<Vec<ColumnPlan>> {
        let kinds = ColumnClassifier::classify(df);
        self.plan_columns(df, &kinds, strategy)
    }

    fn plan_columns(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        strategy: CleaningStrategy,
    ) -> Result<Vec<ColumnPlan>> {
        let normalization_enabled = self.normalizer().is_some();

        df.get_columns()
            .iter()
            .zip(kinds.iter())
            .map(|(column, (_, kind))| {
                ColumnPlan::for_column(
                    column.as_materialized_series(),
                    kind,
                    strategy,
                    normalization_enabled,
                )
            })
            .collect()
    }

    /// The normalizer, if one is configured and normalization is enabled.
    fn normalizer(&self) -> Option<&dyn TextNormalizer> {
        if self.config.normalize_categoricals {
            self.normalizer.as_deref()
        } else {
            None
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(CleaningError::Cancelled);
        }
        Ok(())
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn clean_internal(&self, df: &DataFrame, strategy: CleaningStrategy) -> Result<CleaningOutcome> {
        let start_time = Instant::now();

        info!(
            "Cleaning {} rows x {} columns with strategy {}",
            df.height(),
            df.width(),
            strategy
        );
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Initializing,
            0.0,
            format!("Starting {} cleaning...", strategy),
        ));

        let mut report = CleaningReport::new(strategy);
        report.rows_before = df.height();
        report.completeness_before = completeness(df);
        self.check_cancelled()?;

        self.report_progress(ProgressUpdate::new(
            CleaningStage::Classifying,
            0.0,
            "Classifying columns...",
        ));
        let kinds = ColumnClassifier::classify(df);
        debug!(
            "{} numeric, {} categorical columns",
            kinds.count(ColumnKind::Numeric),
            kinds.count(ColumnKind::Categorical)
        );
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Classifying,
            1.0,
            format!("Classified {} columns", kinds.len()),
        ));
        self.check_cancelled()?;

        let table = match strategy {
            CleaningStrategy::Drop => self.drop_incomplete_rows(df, &kinds, &mut report)?,
            CleaningStrategy::Mean | CleaningStrategy::Median => {
                let plans = self.plan_columns(df, &kinds, strategy)?;
                self.impute(df, &plans, &mut report)?
            }
        };

        report.rows_after = table.height();
        report.completeness_after = completeness(&table);
        report.duration_ms = start_time.elapsed().as_millis() as u64;
        report.generated_at = chrono::Local::now().to_rfc3339();

        info!(
            "Cleaning finished in {}ms: {} rows, {:.1}% complete",
            report.duration_ms,
            report.rows_after,
            report.completeness_after * 100.0
        );

        Ok(CleaningOutcome { table, report })
    }

    fn drop_incomplete_rows(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        report: &mut CleaningReport,
    ) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::DroppingRows,
            0.0,
            "Removing rows with missing values...",
        ));

        let cleaned = df
            .drop_nulls::<String>(None)
            .context("Failed to drop rows with missing values")?;
        let dropped = df.height() - cleaned.height();

        for (column, (name, kind)) in df.get_columns().iter().zip(kinds.iter()) {
            let mut column_report = ColumnReport::new(name, kind, column.null_count());
            column_report.missing_after = 0;
            report.add_column(column_report);
        }

        report.rows_dropped = dropped;
        if dropped > 0 {
            report.add_action(CleaningAction::new(
                ActionType::RowsDropped,
                "dataset",
                format!("Removed {} rows containing missing values", dropped),
            ));
        }
        info!("Dropped {} of {} rows", dropped, df.height());

        self.report_progress(ProgressUpdate::new(
            CleaningStage::DroppingRows,
            1.0,
            format!("Removed {} rows", dropped),
        ));

        Ok(cleaned)
    }

    fn impute(
        &self,
        df: &DataFrame,
        plans: &[ColumnPlan],
        report: &mut CleaningReport,
    ) -> Result<DataFrame> {
        let runner = match self.normalizer() {
            Some(normalizer) => {
                report.normalizer = Some(match normalizer.model() {
                    Some(model) => format!("{} ({})", normalizer.name(), model),
                    None => normalizer.name().to_string(),
                });
                Some(NormalizationRunner::new(
                    normalizer,
                    &self.cancellation_token,
                    self.config.normalization_concurrency,
                )?)
            }
            None => None,
        };

        let total = plans.len();
        let mut columns = Vec::with_capacity(total);

        for (index, (column, plan)) in df.get_columns().iter().zip(plans).enumerate() {
            self.check_cancelled()?;
            self.report_progress(ProgressUpdate::with_items(
                CleaningStage::Imputation,
                format!("Column: {}", plan.name),
                index,
                total,
                format!("Filling '{}'", plan.name),
            ));

            let series = column.as_materialized_series();
            let (cleaned, column_report) =
                self.clean_column(series, plan, runner.as_ref(), report)?;
            columns.push(Column::from(cleaned));
            report.add_column(column_report);
        }

        DataFrame::new(columns).context("Failed to assemble cleaned table")
    }

    fn clean_column(
        &self,
        series: &Series,
        plan: &ColumnPlan,
        runner: Option<&NormalizationRunner<'_>>,
        report: &mut CleaningReport,
    ) -> Result<(Series, ColumnReport)> {
        let mut column_report = ColumnReport::new(&plan.name, plan.kind, plan.missing);

        let Some(fill) = &plan.fill else {
            let reason = plan
                .skipped_reason
                .clone()
                .unwrap_or_else(|| "no fill value".to_string());
            warn!("Column '{}' left unmodified: {}", plan.name, reason);
            report.add_warning(format!("Column '{}' left unmodified: {}", plan.name, reason));
            report.add_action(CleaningAction::new(
                ActionType::ColumnSkipped,
                &plan.name,
                reason.clone(),
            ));
            return Ok((series.clone(), column_report.mark_skipped(reason)));
        };
        column_report.fill_value = Some(fill.to_string());

        match fill {
            FillDecision::Numeric(value) => {
                if plan.missing == 0 {
                    return Ok((series.clone(), column_report));
                }
                let (filled, count) = StatisticalImputer::fill_numeric(series, *value)
                    .context(format!("Failed to fill column '{}'", plan.name))?;
                column_report.cells_filled = count;
                column_report.missing_after = filled.null_count();
                report.add_action(CleaningAction::new(
                    ActionType::ValuesImputed,
                    &plan.name,
                    format!(
                        "Filled {} missing values with {} {}",
                        count,
                        report.strategy.display_name().to_lowercase(),
                        fill
                    ),
                ));
                Ok((filled, column_report))
            }
            FillDecision::Categorical(mode) => {
                self.clean_categorical(series, plan, mode, runner, column_report, report)
            }
            FillDecision::DropRows => Err(CleaningError::Internal(format!(
                "row removal planned for column '{}' during imputation",
                plan.name
            ))),
        }
    }

    fn clean_categorical(
        &self,
        series: &Series,
        plan: &ColumnPlan,
        mode: &str,
        runner: Option<&NormalizationRunner<'_>>,
        mut column_report: ColumnReport,
        report: &mut CleaningReport,
    ) -> Result<(Series, ColumnReport)> {
        let runner = runner.filter(|_| plan.normalize);
        if plan.missing == 0 && runner.is_none() {
            return Ok((series.clone(), column_report));
        }

        let filled_positions = null_positions(series);
        let (filled, count) = StatisticalImputer::fill_categorical(series, mode)
            .context(format!("Failed to fill column '{}'", plan.name))?;

        column_report.cells_filled = count;
        column_report.missing_after = 0;
        if count > 0 {
            report.add_action(CleaningAction::new(
                ActionType::ValuesImputed,
                &plan.name,
                format!("Filled {} missing values with mode '{}'", count, mode),
            ));
        }

        let Some(runner) = runner else {
            record_text_conversion(series, &filled, &mut column_report, report);
            return Ok((filled, column_report));
        };

        let values = string_values(&filled)
            .context(format!("Failed to read column '{}'", plan.name))?;
        let positions: Vec<usize> = match self.config.normalization_scope {
            NormalizationScope::AllCells => (0..values.len()).collect(),
            NormalizationScope::FilledCells => filled_positions,
        };

        self.report_progress(ProgressUpdate::with_items(
            CleaningStage::Normalization,
            format!("Column: {}", plan.name),
            0,
            positions.len(),
            format!("Normalizing {} values in '{}'", positions.len(), plan.name),
        ));

        let outcome = runner.run(values, &positions)?;

        column_report.normalization_attempts = outcome.attempts;
        column_report.cells_normalized = outcome.succeeded;
        column_report.cells_changed = outcome.changed;
        column_report.normalization_failures = outcome.failures.len();

        if let Some((position, first)) = outcome.failures.first() {
            report.add_warning(format!(
                "Normalization failed for {} of {} values in '{}' (first at row {}: {}); original values kept",
                outcome.failures.len(),
                outcome.attempts,
                plan.name,
                position,
                first
            ));
        }
        if outcome.attempts > 0 {
            report.add_action(CleaningAction::new(
                ActionType::ValuesNormalized,
                &plan.name,
                format!(
                    "Normalized {} values, {} corrected",
                    outcome.succeeded, outcome.changed
                ),
            ));
        }

        self.report_progress(ProgressUpdate::with_items(
            CleaningStage::Normalization,
            format!("Column: {}", plan.name),
            positions.len(),
            positions.len(),
            format!("Normalized '{}'", plan.name),
        ));

        let cleaned = Series::new(series.name().clone(), outcome.values);
        record_text_conversion(series, &cleaned, &mut column_report, report);
        Ok((cleaned, column_report))
    }
}

/// Note a categorical column whose cleaned values are text but whose input
/// was not (booleans, dates and other non-string dtypes).
fn record_text_conversion(
    original: &Series,
    cleaned: &Series,
    column_report: &mut ColumnReport,
    report: &mut CleaningReport,
) {
    if original.dtype() == cleaned.dtype() {
        return;
    }
    let from = original.dtype().to_string();
    report.add_warning(format!(
        "Column '{}' converted from {} to {}",
        original.name(),
        from,
        cleaned.dtype()
    ));
    column_report.converted_from = Some(from);
}

/// Builder for creating a [`CleaningEngine`].
#[derive(Default)]
pub struct CleaningEngineBuilder {
    config: Option<CleaningConfig>,
    normalizer: Option<Arc<dyn TextNormalizer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(CleaningEngineBuilder: Send);

impl CleaningEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the normalizer for categorical values.
    ///
    /// Without one, categorical columns are filled but never normalized.
    /// Use `Arc` to share one normalizer (and its cache) across engines.
    pub fn normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Set a progress reporter for receiving updates during cleaning.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping a run.
    ///
    /// Clone the token and call [`CancellationToken::cancel()`] from any
    /// thread. The engine then returns [`CleaningError::Cancelled`].
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the engine.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningEngine, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningEngine {
            config,
            normalizer: self.normalizer,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizationError;
    use crate::normalizer::DictionaryNormalizer;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_df() -> DataFrame {
        df! {
            "age" => &[Some(25.0), None, Some(35.0)],
            "city" => &[Some("NY"), Some("NY"), None],
        }
        .unwrap()
    }

    struct AlwaysFails;

    impl TextNormalizer for AlwaysFails {
        fn normalize(&self, _raw: &str) -> std::result::Result<String, NormalizationError> {
            Err(NormalizationError::Request("service unavailable".into()))
        }

        fn name(&self) -> &str {
            "always-fails"
        }
    }

    #[test]
    fn test_engine_builder_default() {
        let engine = CleaningEngine::builder().build().unwrap();
        assert!(engine.config().normalize_categoricals);
        assert!(engine.active_normalizer().is_none());
    }

    #[test]
    fn test_engine_builder_rejects_invalid_config() {
        let config = CleaningConfig {
            normalization_concurrency: 0,
            ..Default::default()
        };
        assert!(CleaningEngine::builder().config(config).build().is_err());
    }

    #[test]
    fn test_mean_fills_numeric_and_categorical() {
        let engine = CleaningEngine::builder().build().unwrap();
        let outcome = engine.clean(&sample_df(), CleaningStrategy::Mean).unwrap();

        let age: Vec<Option<f64>> = outcome
            .table
            .column("age")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(age, vec![Some(25.0), Some(30.0), Some(35.0)]);

        let city = outcome.table.column("city").unwrap();
        assert_eq!(city.null_count(), 0);
        assert_eq!(city.as_materialized_series().str().unwrap().get(2), Some("NY"));

        assert_eq!(outcome.report.cells_filled(), 2);
        assert_eq!(outcome.report.rows_dropped, 0);
        assert_eq!(outcome.report.completeness_after, 1.0);
        assert!(!outcome.report.generated_at.is_empty());
    }

    #[test]
    fn test_drop_removes_incomplete_rows() {
        let engine = CleaningEngine::builder().build().unwrap();
        let outcome = engine.clean(&sample_df(), CleaningStrategy::Drop).unwrap();

        assert_eq!(outcome.table.height(), 1);
        assert_eq!(outcome.report.rows_dropped, 2);
        assert_eq!(outcome.report.rows_before, 3);
        assert_eq!(outcome.report.rows_after, 1);
        assert_eq!(
            outcome.report.actions[0].action_type,
            ActionType::RowsDropped
        );
    }

    #[test]
    fn test_drop_never_calls_normalizer() {
        let engine = CleaningEngine::builder()
            .normalizer(Arc::new(AlwaysFails))
            .build()
            .unwrap();
        let outcome = engine.clean(&sample_df(), CleaningStrategy::Drop).unwrap();

        assert_eq!(outcome.report.normalization_failures(), 0);
        assert!(outcome.report.normalizer.is_none());
    }

    #[test]
    fn test_input_is_not_modified() {
        let df = sample_df();
        let engine = CleaningEngine::builder().build().unwrap();
        engine.clean(&df, CleaningStrategy::Median).unwrap();

        assert_eq!(df.column("age").unwrap().null_count(), 1);
        assert_eq!(df.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_boolean_column_conversion_is_reported() {
        let df = df! {
            "active" => &[Some(true), None, Some(true)],
            "city" => &[Some("NY"), None, Some("LA")],
        }
        .unwrap();
        let engine = CleaningEngine::builder().build().unwrap();

        let outcome = engine.clean(&df, CleaningStrategy::Mean).unwrap();

        let active = outcome.table.column("active").unwrap();
        assert_eq!(active.dtype(), &DataType::String);
        assert_eq!(
            active.as_materialized_series().str().unwrap().get(1),
            Some("true")
        );
        let column = outcome.report.column("active").unwrap();
        assert_eq!(column.converted_from.as_deref(), Some("bool"));
        assert_eq!(outcome.report.column("city").unwrap().converted_from, None);
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].contains("'active'"));
    }

    #[test]
    fn test_empty_column_is_skipped_with_warning() {
        let df = df! {
            "score" => &[Some(1.0), None],
            "notes" => &[Option::<&str>::None, None],
        }
        .unwrap();
        let engine = CleaningEngine::builder().build().unwrap();

        let outcome = engine.clean(&df, CleaningStrategy::Mean).unwrap();

        assert_eq!(outcome.table.column("notes").unwrap().null_count(), 2);
        assert_eq!(outcome.table.column("score").unwrap().null_count(), 0);
        assert_eq!(outcome.report.skipped_columns(), vec!["notes"]);
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.has_partial_failures());
    }

    #[test]
    fn test_normalization_failures_keep_values_and_are_counted() {
        let engine = CleaningEngine::builder()
            .normalizer(Arc::new(AlwaysFails))
            .build()
            .unwrap();

        let outcome = engine.clean(&sample_df(), CleaningStrategy::Mean).unwrap();

        let city = outcome.report.column("city").unwrap();
        assert_eq!(city.normalization_attempts, 3);
        assert_eq!(city.normalization_failures, 3);
        assert_eq!(city.cells_changed, 0);
        let values: Vec<Option<&str>> =
            outcome
            .table
            .column("city")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("NY"), Some("NY"), Some("NY")]);
        assert_eq!(outcome.report.normalizer.as_deref(), Some("always-fails"));
    }

    #[test]
    fn test_filled_cells_scope_only_normalizes_filled_positions() {
        let df = df! { "city" => &[Some("nyc"), None, Some("nyc")] }.unwrap();
        let config = CleaningConfig::builder()
            .normalization_scope(NormalizationScope::FilledCells)
            .build()
            .unwrap();
        let engine = CleaningEngine::builder()
            .config(config)
            .normalizer(Arc::new(
                DictionaryNormalizer::new().with_alias("nyc", "New York"),
            ))
            .build()
            .unwrap();

        let outcome = engine.clean(&df, CleaningStrategy::Mean).unwrap();

        let values: Vec<Option<&str>> =
            outcome
            .table
            .column("city")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("nyc"), Some("New York"), Some("nyc")]);
        assert_eq!(outcome.report.column("city").unwrap().normalization_attempts, 1);
    }

    #[test]
    fn test_disabled_normalization_skips_normalizer() {
        let config = CleaningConfig::builder()
            .normalize_categoricals(false)
            .build()
            .unwrap();
        let engine = CleaningEngine::builder()
            .config(config)
            .normalizer(Arc::new(AlwaysFails))
            .build()
            .unwrap();

        let outcome = engine.clean(&sample_df(), CleaningStrategy::Mean).unwrap();
        assert_eq!(outcome.report.normalization_failures(), 0);
        assert!(engine.active_normalizer().is_none());
    }

    #[test]
    fn test_clean_named_rejects_unknown_strategy() {
        let engine = CleaningEngine::builder().build().unwrap();
        let result = engine.clean_named(&sample_df(), "average");
        assert!(matches!(result, Err(CleaningError::InvalidStrategy(_))));

        assert!(engine.clean_named(&sample_df(), " MEDIAN ").is_ok());
    }

    #[test]
    fn test_plan_describes_each_column() {
        let engine = CleaningEngine::builder().build().unwrap();
        let plans = engine.plan(&sample_df(), CleaningStrategy::Median).unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].fill, Some(FillDecision::Numeric(30.0)));
        assert_eq!(plans[1].fill, Some(FillDecision::Categorical("NY".into())));
    }

    #[test]
    fn test_cancelled_run_returns_error() {
        let token = CancellationToken::new();
        token.cancel();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let engine = CleaningEngine::builder()
            .cancellation_token(token)
            .on_progress(move |update| stages_clone.lock().push(update.stage))
            .build()
            .unwrap();

        let result = engine.clean(&sample_df(), CleaningStrategy::Mean);

        assert!(matches!(result, Err(CleaningError::Cancelled)));
        assert_eq!(stages.lock().last(), Some(&CleaningStage::Cancelled));
    }

    #[test]
    fn test_progress_reports_completion() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let last = Arc::new(Mutex::new(None));
        let last_clone = last.clone();

        let engine = CleaningEngine::builder()
            .on_progress(move |update| {
                count_clone.fetch_add(1, Ordering::SeqCst);
                *last_clone.lock() = Some(update.stage);
            })
            .build()
            .unwrap();

        engine.clean(&sample_df(), CleaningStrategy::Mean).unwrap();

        assert!(count.load(Ordering::SeqCst) > 3);
        assert_eq!(*last.lock(), Some(CleaningStage::Complete));
    }
}
