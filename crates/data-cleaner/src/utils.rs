//! Shared utilities for the cleaning engine.
//!
//! Dtype checks and null-aware series helpers used by the classifier,
//! the imputers and the engine.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer, float or decimal).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Int128
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal(_, _)
    )
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Values of a series as optional strings, missing cells as `None`.
///
/// Non-string series are cast to `String` first, so numbers and booleans
/// keep their textual form.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_str = series.cast(&DataType::String)?;
    Ok(as_str
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Positions of missing cells in a series.
pub fn null_positions(series: &Series) -> Vec<usize> {
    series
        .is_null()
        .into_iter()
        .enumerate()
        .filter_map(|(i, is_null)| is_null.unwrap_or(false).then_some(i))
        .collect()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replace NaN with null in a float series; other series are returned as is.
pub fn nan_to_null(series: &Series) -> PolarsResult<Series> {
    let name = series.name().clone();
    match series.dtype() {
        DataType::Float64 => {
            let values: Vec<Option<f64>> = series
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Series::new(name, values))
        }
        DataType::Float32 => {
            let values: Vec<Option<f32>> = series
                .f32()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Series::new(name, values))
        }
        _ => Ok(series.clone()),
    }
}

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let as_float = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = as_float
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with a string, returning a `String` series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Table Statistics
// =============================================================================

/// Total number of missing cells across all columns.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|c| c.null_count()).sum()
}

/// Fraction of non-missing cells in the table (1.0 for an empty table).
pub fn completeness(df: &DataFrame) -> f32 {
    let total = df.height() * df.width();
    if total == 0 {
        return 1.0;
    }
    1.0 - (total_null_count(df) as f32 / total as f32)
}

// =============================================================================
// Tests
// =============================================================================
