//! Text normalization for categorical values.
//!
//! The engine talks to normalizers only through the [`TextNormalizer`]
//! trait. Available implementations:
//!
//! - [`GeminiNormalizer`] - Google Gemini API (requires `ai` feature)
//! - [`DictionaryNormalizer`] - local alias table
//! - [`IdentityNormalizer`] - returns values unchanged
//! - [`CachingNormalizer`] - memoizes another normalizer
//!
//! # Feature Flag
//!
//! ```toml
//! # Enable the Gemini normalizer (default)
//! data-cleaner = { version = "0.1", features = ["ai"] }
//!
//! # Local normalizers only
//! data-cleaner = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use data_cleaner::normalizer::{CachingNormalizer, GeminiNormalizer};
//! use data_cleaner::CleaningEngine;
//! use std::sync::Arc;
//!
//! let normalizer = CachingNormalizer::new(GeminiNormalizer::new(api_key)?);
//!
//! let engine = CleaningEngine::builder()
//!     .normalizer(Arc::new(normalizer))
//!     .build()?;
//! ```

mod caching;
mod dictionary;
mod provider;

pub use caching::CachingNormalizer;
pub use dictionary::{DictionaryNormalizer, collapse_whitespace};
pub use provider::{IdentityNormalizer, TextNormalizer};

#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::{GeminiConfig, GeminiConfigBuilder, GeminiNormalizer};
