//! Runs a [`TextNormalizer`] over the cells of one column.
//!
//! Calls are either sequential on the calling thread or fanned out over a
//! bounded `rayon` pool. Either way each result is written back to the row
//! it came from.

use super::progress::CancellationToken;
use crate::error::{CleaningError, NormalizationError, Result};
use crate::normalizer::TextNormalizer;
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Result of normalizing one column.
#[derive(Debug, Default)]
pub(crate) struct NormalizationOutcome {
    pub values: Vec<Option<String>>,
    pub attempts: usize,
    pub succeeded: usize,
    pub changed: usize,
    /// Row position and error of every failed call.
    pub failures: Vec<(usize, NormalizationError)>,
}

pub(crate) struct NormalizationRunner<'a> {
    normalizer: &'a dyn TextNormalizer,
    token: &'a CancellationToken,
    pool: Option<ThreadPool>,
}

impl<'a> NormalizationRunner<'a> {
    /// Create a runner allowing at most `concurrency` calls in flight.
    pub fn new(
        normalizer: &'a dyn TextNormalizer,
        token: &'a CancellationToken,
        concurrency: usize,
    ) -> Result<Self> {
        let pool = if concurrency > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(concurrency)
                .thread_name(|i| format!("normalizer-{i}"))
                .build()
                .map_err(|e| {
                    CleaningError::Internal(format!("failed to build normalizer pool: {e}"))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            normalizer,
            token,
            pool,
        })
    }

    /// Normalize the cells at `positions`, leaving all other cells as-is.
    ///
    /// A failed call keeps the cell's current value. Returns
    /// [`CleaningError::Cancelled`] if the token fired at any point, so a
    /// partially normalized column is never handed back.
    pub fn run(
        &self,
        values: Vec<Option<String>>,
        positions: &[usize],
    ) -> Result<NormalizationOutcome> {
        let results: Vec<(usize, std::result::Result<String, NormalizationError>)> = {
            let targets: Vec<(usize, &str)> = positions
                .iter()
                .filter_map(|&i| values.get(i).and_then(|v| v.as_deref()).map(|v| (i, v)))
                .collect();

            match &self.pool {
                Some(pool) => pool.install(|| {
                    targets
                        .par_iter()
                        .map(|&(i, raw)| (i, self.call(raw)))
                        .collect()
                }),
                None => targets
                    .iter()
                    .map(|&(i, raw)| (i, self.call(raw)))
                    .collect(),
            }
        };

        if self.token.is_cancelled() {
            return Err(CleaningError::Cancelled);
        }

        let mut outcome = NormalizationOutcome {
            attempts: results.len(),
            ..Default::default()
        };
        let mut values = values;

        for (position, result) in results {
            match result {
                Ok(normalized) => {
                    outcome.succeeded += 1;
                    if let Some(slot) = values.get_mut(position)
                        && slot.as_deref() != Some(normalized.as_str())
                    {
                        *slot = Some(normalized);
                        outcome.changed += 1;
                    }
                }
                Err(err) => {
                    warn!("Normalization failed for row {}: {}", position, err);
                    outcome.failures.push((position, err));
                }
            }
        }

        debug!(
            "Normalized {} cells via {}: {} ok, {} changed, {} failed",
            outcome.attempts,
            self.normalizer.name(),
            outcome.succeeded,
            outcome.changed,
            outcome.failures.len()
        );

        outcome.values = values;
        Ok(outcome)
    }

    fn call(&self, raw: &str) -> std::result::Result<String, NormalizationError> {
        if self.token.is_cancelled() {
            return Err(NormalizationError::Cancelled);
        }
        self.normalizer.normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::DictionaryNormalizer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowUpper;

    impl TextNormalizer for SlowUpper {
        fn normalize(&self, raw: &str) -> std::result::Result<String, NormalizationError> {
            // Later rows finish first, so ordering bugs would show up.
            let delay = 20u64.saturating_sub(raw.len() as u64);
            std::thread::sleep(std::time::Duration::from_millis(delay));
            Ok(raw.to_uppercase())
        }

        fn name(&self) -> &str {
            "slow-upper"
        }
    }

    struct FailOn(&'static str);

    impl TextNormalizer for FailOn {
        fn normalize(&self, raw: &str) -> std::result::Result<String, NormalizationError> {
            if raw == self.0 {
                Err(NormalizationError::Request("unavailable".into()))
            } else {
                Ok(format!("{raw}!"))
            }
        }

        fn name(&self) -> &str {
            "fail-on"
        }
    }

    fn column(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_parallel_results_keep_row_positions() {
        let token = CancellationToken::new();
        let runner = NormalizationRunner::new(&SlowUpper, &token, 4).unwrap();
        let values = column(&["a", "bb", "ccc", "dddd", "eeeee", "ffffff"]);

        let outcome = runner.run(values, &[0, 1, 2, 3, 4, 5]).unwrap();

        assert_eq!(
            outcome.values,
            column(&["A", "BB", "CCC", "DDDD", "EEEEE", "FFFFFF"])
        );
        assert_eq!(outcome.attempts, 6);
        assert_eq!(outcome.changed, 6);
    }

    #[test]
    fn test_only_listed_positions_are_normalized() {
        let token = CancellationToken::new();
        let runner = NormalizationRunner::new(&SlowUpper, &token, 1).unwrap();

        let outcome = runner.run(column(&["a", "b", "c"]), &[1]).unwrap();

        assert_eq!(outcome.values, column(&["a", "B", "c"]));
        assert_eq!(outcome.attempts, 1);
    }

    #[test]
    fn test_failures_keep_prior_value() {
        let token = CancellationToken::new();
        let runner = NormalizationRunner::new(&FailOn("b"), &token, 2).unwrap();

        let outcome = runner.run(column(&["a", "b", "c"]), &[0, 1, 2]).unwrap();

        assert_eq!(outcome.values, column(&["a!", "b", "c!"]));
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 1);
    }

    #[test]
    fn test_unchanged_values_are_not_counted_as_changed() {
        let token = CancellationToken::new();
        let normalizer = DictionaryNormalizer::new();
        let runner = NormalizationRunner::new(&normalizer, &token, 1).unwrap();

        let outcome = runner.run(column(&["NY", " NY "]), &[0, 1]).unwrap();

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.changed, 1);
        assert_eq!(outcome.values, column(&["NY", "NY"]));
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        let token = CancellationToken::new();
        let runner = NormalizationRunner::new(&SlowUpper, &token, 1).unwrap();

        let outcome = runner
            .run(vec![None, Some("x".to_string())], &[0, 1])
            .unwrap();

        assert_eq!(outcome.values, vec![None, Some("X".to_string())]);
        assert_eq!(outcome.attempts, 1);
    }

    #[test]
    fn test_cancellation_returns_error() {
        struct CancelAfterFirst<'t> {
            token: &'t CancellationToken,
            calls: AtomicUsize,
        }

        impl TextNormalizer for CancelAfterFirst<'_> {
            fn normalize(&self, raw: &str) -> std::result::Result<String, NormalizationError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.token.cancel();
                Ok(raw.to_string())
            }

            fn name(&self) -> &str {
                "cancel-after-first"
            }
        }

        let token = CancellationToken::new();
        let normalizer = CancelAfterFirst {
            token: &token,
            calls: AtomicUsize::new(0),
        };
        let runner = NormalizationRunner::new(&normalizer, &token, 1).unwrap();

        let result = runner.run(column(&["a", "b", "c"]), &[0, 1, 2]);

        assert!(matches!(result, Err(CleaningError::Cancelled)));
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 1);
    }
}
