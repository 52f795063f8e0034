//! Data Cleaner Library
//!
//! Missing-value imputation and categorical normalization for tabular data,
//! built on Polars.
//!
//! # Overview
//!
//! - **Column Classification**: every column is NUMERIC or CATEGORICAL
//! - **Missing Values**: drop incomplete rows, or fill with mean/median
//!   (numeric) and mode (categorical)
//! - **Normalization**: categorical values pass through a pluggable
//!   [`TextNormalizer`], optionally in parallel
//! - **Reporting**: every run returns a [`CleaningReport`] recording what
//!   changed and which failures were absorbed
//! - **Progress Reporting**: progress updates with cancellation support
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_cleaner::{CleaningEngine, CleaningStrategy, TableLoader};
//!
//! let df = TableLoader::load_path("data.csv")?;
//!
//! let outcome = CleaningEngine::builder()
//!     .build()?
//!     .clean(&df, CleaningStrategy::Median)?;
//!
//! println!("Filled {} cells", outcome.report.cells_filled());
//! ```
//!
//! # Normalizers
//!
//! - [`normalizer::GeminiNormalizer`] - Google Gemini API (feature `ai`)
//! - [`DictionaryNormalizer`] - local alias table
//! - [`CachingNormalizer`] - memoizes any other normalizer
//!
//! To implement your own, see the [`normalizer`] module documentation.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use data_cleaner::config::*;
//!
//! let config = CleaningConfig::builder()
//!     .normalization_scope(NormalizationScope::FilledCells)
//!     .normalization_concurrency(8)
//!     .build()?;
//! ```
//!
//! # Cancellation
//!
//! ```rust,ignore
//! use data_cleaner::{CancellationToken, CleaningEngine, CleaningError, CleaningStrategy};
//!
//! let token = CancellationToken::new();
//! let engine = CleaningEngine::builder()
//!     .cancellation_token(token.clone())
//!     .build()?;
//!
//! match engine.clean(&df, CleaningStrategy::Mean) {
//!     Ok(outcome) => println!("{} rows", outcome.table.height()),
//!     Err(CleaningError::Cancelled) => println!("Cancelled by user"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod imputers;
pub mod io;
pub mod normalizer;
pub mod reporting;
pub mod utils;

pub use classifier::{ColumnClassifier, ColumnKind, ColumnKinds};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, CleaningStrategy, ConfigValidationError,
    NormalizationScope,
};
pub use engine::{
    CancellationToken, CleaningEngine, CleaningEngineBuilder, CleaningOutcome, CleaningStage,
    ClosureProgressReporter, ColumnPlan, ProgressReporter, ProgressUpdate,
};
pub use error::{CleaningError, NormalizationError, Result as CleaningResult, ResultExt};
pub use imputers::{FillDecision, MissingValuePolicy, StatisticalImputer};
pub use io::{Exporter, TableFormat, TableLoader};
pub use normalizer::{CachingNormalizer, DictionaryNormalizer, IdentityNormalizer, TextNormalizer};
pub use reporting::{ActionType, CleaningAction, CleaningReport, ColumnReport, ReportGenerator};
