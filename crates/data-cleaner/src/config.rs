//! Configuration types for the cleaning engine.
//!
//! The strategy is chosen per run and passed to
//! [`CleaningEngine::clean`](crate::CleaningEngine::clean); everything else
//! lives in [`CleaningConfig`], built with a fluent builder.

use crate::classifier::ColumnKinds;
use crate::error::CleaningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Cleaning method applied uniformly to every column in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStrategy {
    /// Remove every row that has a missing cell in any column
    Drop,
    /// Fill numeric columns with the mean, categorical columns with the mode
    Mean,
    /// Fill numeric columns with the median, categorical columns with the mode
    Median,
}

impl CleaningStrategy {
    /// All strategies in the order they are offered to users.
    pub const ALL: [CleaningStrategy; 3] = [Self::Mean, Self::Median, Self::Drop];

    /// Human-readable name, as shown on the selection surface.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Drop => "Drop",
            Self::Mean => "Mean",
            Self::Median => "Median",
        }
    }

    /// Whether this strategy fills cells (and may normalize them) instead of
    /// removing rows.
    pub fn is_imputation(&self) -> bool {
        !matches!(self, Self::Drop)
    }

    /// Strategy used by the one-click "clean" action when the caller has not
    /// chosen one.
    ///
    /// Tables with at least one categorical column are cleaned by dropping
    /// incomplete rows. All-numeric tables have no default and the caller
    /// must pick a strategy.
    pub fn fast_path(kinds: &ColumnKinds) -> Option<CleaningStrategy> {
        kinds.has_categorical().then_some(CleaningStrategy::Drop)
    }
}

impl fmt::Display for CleaningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CleaningStrategy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            _ => Err(CleaningError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Which categorical cells are passed through the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationScope {
    /// Every cell of a categorical column, filled or original
    #[default]
    AllCells,
    /// Only cells that were missing before the mode fill
    FilledCells,
}

/// Configuration for the cleaning engine.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::config::{CleaningConfig, NormalizationScope};
///
/// let config = CleaningConfig::builder()
///     .normalization_scope(NormalizationScope::FilledCells)
///     .normalization_concurrency(8)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Whether categorical values are sent through the normalizer.
    /// Has no effect when no normalizer is configured.
    /// Default: true
    pub normalize_categoricals: bool,

    /// Which categorical cells are normalized.
    /// Default: AllCells
    pub normalization_scope: NormalizationScope,

    /// Maximum number of normalization calls in flight. 1 runs them
    /// sequentially on the calling thread.
    /// Default: 4
    pub normalization_concurrency: usize,

    /// Output directory for cleaned data and reports.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Custom output file name (without extension).
    /// If None, uses "{input_stem}_cleaned_data".
    /// Default: None
    pub output_name: Option<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            normalize_categoricals: true,
            normalization_scope: NormalizationScope::default(),
            normalization_concurrency: 4,
            output_dir: PathBuf::from("output"),
            output_name: None,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.normalization_concurrency == 0 {
            return Err(ConfigValidationError::InvalidConcurrency(
                self.normalization_concurrency,
            ));
        }

        if let Some(name) = &self.output_name
            && (name.trim().is_empty() || name.contains(['/', '\\']))
        {
            return Err(ConfigValidationError::InvalidOutputName(name.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid normalization concurrency: {0} (must be at least 1)")]
    InvalidConcurrency(usize),

    #[error("Invalid output name '{0}' (must be a non-empty file stem)")]
    InvalidOutputName(String),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    normalize_categoricals: Option<bool>,
    normalization_scope: Option<NormalizationScope>,
    normalization_concurrency: Option<usize>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl CleaningConfigBuilder {
    /// Enable or disable normalization of categorical values.
    pub fn normalize_categoricals(mut self, enabled: bool) -> Self {
        self.normalize_categoricals = Some(enabled);
        self
    }

    /// Set which categorical cells are normalized.
    pub fn normalization_scope(mut self, scope: NormalizationScope) -> Self {
        self.normalization_scope = Some(scope);
        self
    }

    /// Set the maximum number of concurrent normalization calls.
    pub fn normalization_concurrency(mut self, concurrency: usize) -> Self {
        self.normalization_concurrency = Some(concurrency);
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set a custom output file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            normalize_categoricals: self
                .normalize_categoricals
                .unwrap_or(defaults.normalize_categoricals),
            normalization_scope: self
                .normalization_scope
                .unwrap_or(defaults.normalization_scope),
            normalization_concurrency: self
                .normalization_concurrency
                .unwrap_or(defaults.normalization_concurrency),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ColumnKind;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Drop".parse::<CleaningStrategy>().unwrap(), CleaningStrategy::Drop);
        assert_eq!("mean".parse::<CleaningStrategy>().unwrap(), CleaningStrategy::Mean);
        assert_eq!(" MEDIAN ".parse::<CleaningStrategy>().unwrap(), CleaningStrategy::Median);
    }

    #[test]
    fn test_strategy_from_str_rejects_unknown() {
        let err = "mode".parse::<CleaningStrategy>().unwrap_err();
        assert!(matches!(err, CleaningError::InvalidStrategy(ref s) if s == "mode"));
        assert!("".parse::<CleaningStrategy>().is_err());
    }

    #[test]
    fn test_strategy_display_and_serde() {
        assert_eq!(CleaningStrategy::Median.to_string(), "Median");
        let json = serde_json::to_string(&CleaningStrategy::Drop).unwrap();
        assert_eq!(json, "\"drop\"");
    }

    #[test]
    fn test_fast_path() {
        let mixed = ColumnKinds::from_pairs([
            ("age", ColumnKind::Numeric),
            ("city", ColumnKind::Categorical),
        ]);
        assert_eq!(CleaningStrategy::fast_path(&mixed), Some(CleaningStrategy::Drop));

        let numeric = ColumnKinds::from_pairs([("age", ColumnKind::Numeric)]);
        assert_eq!(CleaningStrategy::fast_path(&numeric), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = CleaningConfig::builder().build().unwrap();
        assert!(config.normalize_categoricals);
        assert_eq!(config.normalization_scope, NormalizationScope::AllCells);
        assert_eq!(config.normalization_concurrency, 4);
        assert!(config.output_name.is_none());
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        let result = CleaningConfig::builder().normalization_concurrency(0).build();
        assert!(matches!(result, Err(ConfigValidationError::InvalidConcurrency(0))));
    }

    #[test]
    fn test_config_rejects_path_like_output_name() {
        let result = CleaningConfig::builder().output_name("../escape").build();
        assert!(matches!(result, Err(ConfigValidationError::InvalidOutputName(_))));
    }
}
