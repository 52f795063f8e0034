//! Error types for the cleaning engine.
//!
//! Per-cell and per-column failures ([`CleaningError::EmptyColumn`],
//! [`NormalizationError`]) are absorbed by the engine and recorded in the
//! report. Everything else aborts the run before a table is returned.
//!
//! Errors are serializable so a frontend can render them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Failure of a single text normalization call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    /// The normalization service could not be reached or returned an error status.
    #[error("normalization request failed: {0}")]
    Request(String),

    /// The service answered without any usable text.
    #[error("normalization service returned an empty response")]
    EmptyResponse,

    /// The service refused to answer (e.g. a safety filter).
    #[error("normalization blocked: {0}")]
    Blocked(String),

    /// The run was cancelled before the call was made.
    #[error("normalization skipped after cancellation")]
    Cancelled,
}

/// The main error type for the cleaning engine.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Run was cancelled by the caller.
    #[error("Cleaning cancelled")]
    Cancelled,

    /// Strategy name is not one of Drop, Mean or Median.
    #[error("Invalid cleaning strategy '{0}' (expected one of: Drop, Mean, Median)")]
    InvalidStrategy(String),

    /// Input could not be parsed into a table.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// A column has no non-missing values to derive a fill value from.
    #[error("No non-missing values in column '{0}'")]
    EmptyColumn(String),

    /// A text normalization call failed.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (e.g. thread pool construction failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl From<crate::config::ConfigValidationError> for CleaningError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::InvalidStrategy(_) => "INVALID_STRATEGY",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::EmptyColumn(_) => "EMPTY_COLUMN",
            Self::Normalization(_) => "NORMALIZATION_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Check if the engine absorbs this error instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptyColumn(_) | Self::Normalization(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Check if this error is a rejection of the request itself, raised
    /// before any cleaning work begins.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::InvalidStrategy(_) | Self::UnsupportedFormat(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_rejection(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
