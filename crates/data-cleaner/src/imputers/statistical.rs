//! Statistical measures used as fill values.
//!
//! Provides mean, median and mode over the non-missing values of a column,
//! and the fill operations that apply them.

use crate::error::{CleaningError, Result};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_values};
use polars::prelude::*;
use std::collections::HashMap;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Arithmetic mean of the non-missing values.
    pub fn mean(series: &Series) -> Result<f64> {
        series
            .cast(&DataType::Float64)?
            .mean()
            .ok_or_else(|| CleaningError::EmptyColumn(series.name().to_string()))
    }

    /// Median of the non-missing values. An even count averages the two
    /// middle values.
    pub fn median(series: &Series) -> Result<f64> {
        series
            .cast(&DataType::Float64)?
            .median()
            .ok_or_else(|| CleaningError::EmptyColumn(series.name().to_string()))
    }

    /// Most frequent non-missing value, compared by its string form.
    ///
    /// Ties go to the value encountered first in column order.
    pub fn mode(series: &Series) -> Result<String> {
        let values = string_values(series)?;
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

        for (position, value) in values.iter().enumerate() {
            if let Some(value) = value {
                counts
                    .entry(value.as_str())
                    .and_modify(|(count, _)| *count += 1)
                    .or_insert((1, position));
            }
        }

        counts
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(value, _)| value.to_string())
            .ok_or_else(|| CleaningError::EmptyColumn(series.name().to_string()))
    }

    /// Replace missing cells of a numeric column with `fill_value`.
    ///
    /// Returns the filled `Float64` series and the number of cells filled.
    pub fn fill_numeric(series: &Series, fill_value: f64) -> Result<(Series, usize)> {
        let missing = series.null_count();
        Ok((fill_numeric_nulls(series, fill_value)?, missing))
    }

    /// Replace missing cells of a categorical column with `fill_value`.
    ///
    /// Returns the filled `String` series and the number of cells filled.
    pub fn fill_categorical(series: &Series, fill_value: &str) -> Result<(Series, usize)> {
        let missing = series.null_count();
        Ok((fill_string_nulls(series, fill_value)?, missing))
    }
}
