//! Imputation module for handling missing values.
//!
//! - [`MissingValuePolicy`] decides the fill for each column
//! - [`StatisticalImputer`] computes mean, median and mode and applies fills

mod policy;
mod statistical;

pub use policy::{FillDecision, MissingValuePolicy};
pub use statistical::StatisticalImputer;
