//! Local, dictionary-based normalizer.
//!
//! Collapses whitespace and maps known aliases (case-insensitive) to a
//! canonical spelling. Useful offline and in tests.

use super::TextNormalizer;
use crate::error::NormalizationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse runs of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

/// Normalizer backed by an in-memory alias table.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::normalizer::DictionaryNormalizer;
///
/// let normalizer = DictionaryNormalizer::new()
///     .with_alias("nyc", "New York")
///     .with_alias("new york city", "New York");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DictionaryNormalizer {
    aliases: HashMap<String, String>,
}

impl DictionaryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `alias` (matched case-insensitively after whitespace collapsing)
    /// to `canonical`.
    pub fn with_alias(mut self, alias: impl AsRef<str>, canonical: impl Into<String>) -> Self {
        self.aliases
            .insert(Self::key(alias.as_ref()), canonical.into());
        self
    }

    /// Build a normalizer from `(alias, canonical)` pairs.
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |normalizer, (alias, canonical)| {
                normalizer.with_alias(alias, canonical)
            })
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    fn key(value: &str) -> String {
        collapse_whitespace(value).to_lowercase()
    }
}

impl TextNormalizer for DictionaryNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
        let collapsed = collapse_whitespace(raw);
        Ok(self
            .aliases
            .get(&collapsed.to_lowercase())
            .cloned()
            .unwrap_or(collapsed))
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  New \t  York \n"), "New York");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_alias_lookup_is_case_insensitive() {
        let normalizer = DictionaryNormalizer::new().with_alias("NYC", "New York");

        assert_eq!(normalizer.normalize("nyc").unwrap(), "New York");
        assert_eq!(normalizer.normalize("  Nyc ").unwrap(), "New York");
    }

    #[test]
    fn test_unknown_values_are_tidied_only() {
        let normalizer = DictionaryNormalizer::from_pairs([("la", "Los Angeles")]);

        assert_eq!(normalizer.normalize(" Boston  MA ").unwrap(), "Boston MA");
        assert_eq!(normalizer.len(), 1);
    }
}
