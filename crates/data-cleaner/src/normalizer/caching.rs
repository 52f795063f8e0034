//! Memoizing wrapper around another normalizer.

use super::TextNormalizer;
use crate::error::NormalizationError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Caches successful results of an inner normalizer by input value.
///
/// Categorical columns repeat the same few values many times, so wrapping a
/// remote normalizer in this type saves one request per repeated value.
/// Failures are not cached and are retried on the next call.
pub struct CachingNormalizer<N> {
    inner: N,
    cache: Mutex<HashMap<String, String>>,
}

impl<N: TextNormalizer> CachingNormalizer<N> {
    pub fn new(inner: N) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached values.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop all cached values.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

impl<N: TextNormalizer> TextNormalizer for CachingNormalizer<N> {
    fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
        if let Some(hit) = self.cache.lock().get(raw) {
            return Ok(hit.clone());
        }

        // Lock is released during the inner call; concurrent misses on the
        // same value may both reach the inner normalizer.
        let normalized = self.inner.normalize(raw)?;
        self.cache
            .lock()
            .insert(raw.to_string(), normalized.clone());
        Ok(normalized)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> Option<&str> {
        self.inner.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingNormalizer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl TextNormalizer for CountingNormalizer {
        fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NormalizationError::EmptyResponse)
            } else {
                Ok(raw.to_uppercase())
            }
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_repeated_values_hit_cache() {
        let normalizer = CachingNormalizer::new(CountingNormalizer {
            calls: AtomicUsize::new(0),
            fail: false,
        });

        assert_eq!(normalizer.normalize("ny").unwrap(), "NY");
        assert_eq!(normalizer.normalize("ny").unwrap(), "NY");
        assert_eq!(normalizer.normalize("la").unwrap(), "LA");

        assert_eq!(normalizer.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(normalizer.cached(), 2);
        assert_eq!(normalizer.name(), "counting");
    }

    #[test]
    fn test_failures_are_not_cached() {
        let normalizer = CachingNormalizer::new(CountingNormalizer {
            calls: AtomicUsize::new(0),
            fail: true,
        });

        assert!(normalizer.normalize("ny").is_err());
        assert!(normalizer.normalize("ny").is_err());

        assert_eq!(normalizer.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(normalizer.cached(), 0);
    }
}
