//! Cleaning engine orchestration.
//!
//! Contains the [`CleaningEngine`], the per-column [`ColumnPlan`], progress
//! reporting and cancellation.

mod builder;
mod normalize;
mod plan;
pub mod progress;

pub use builder::{CleaningEngine, CleaningEngineBuilder, CleaningOutcome};
pub use plan::ColumnPlan;
pub use progress::{
    CancellationToken, CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
