//! Text normalizer trait for abstracting value correction.
//!
//! The engine only depends on [`TextNormalizer`]; whether a value is fixed
//! by a remote LLM, a local dictionary or not at all is decided by whoever
//! constructs the engine.
//!
//! # Implementing a New Normalizer
//!
//! 1. Create a new file in `src/normalizer/`
//! 2. Implement [`TextNormalizer`] for your struct
//! 3. Export it from `src/normalizer/mod.rs`

use crate::error::NormalizationError;

/// Corrects or standardizes a single categorical value.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the engine may call
/// [`normalize`](Self::normalize) from several worker threads at once.
///
/// # Error Handling
///
/// A failed call never aborts a cleaning run. The engine keeps the value it
/// passed in and counts the failure in the report.
pub trait TextNormalizer: Send + Sync {
    /// Return the corrected form of `raw`.
    fn normalize(&self, raw: &str) -> Result<String, NormalizationError>;

    /// Get the normalizer name for logging and reports.
    fn name(&self) -> &str;

    /// Get the model behind this normalizer, if any.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// Normalizer that returns every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl TextNormalizer for IdentityNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
        Ok(raw.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}
