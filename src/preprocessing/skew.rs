//! Skewness detection and log1p correction

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Bias-adjusted Fisher-Pearson sample skewness of the non-null values.
///
/// Returns `None` for fewer than three values. A constant column has zero
/// skewness.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / nf;

    // Rounding residue of a constant column, relative to its own magnitude
    if m2 <= (f64::EPSILON * mean).powi(2) {
        return Some(0.0);
    }

    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

fn column_values(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
    Ok(column.cast(&DataType::Float64)?.f64()?.clone())
}

/// Skewness of a frame column
pub fn column_skewness(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    let values: Vec<f64> = column_values(df, name)?.into_iter().flatten().collect();
    Ok(skewness(&values))
}

/// Replace each of `columns` whose skewness exceeds `threshold` with its
/// log1p transform. Returns the names of the transformed columns.
pub fn correct_skew(df: &mut DataFrame, columns: &[String], threshold: f64) -> Result<Vec<String>> {
    let mut transformed = Vec::new();

    for name in columns {
        let skew = column_skewness(df, name)?;
        tracing::debug!(column = %name, skewness = ?skew, "Column skewness");

        if skew.is_some_and(|s| s > threshold) {
            let values = column_values(df, name)?;
            let logged: Float64Chunked = values.apply_values(f64::ln_1p);
            df.with_column(logged.into_series().with_name(name.as_str().into()))?;
            transformed.push(name.clone());
        }
    }

    Ok(transformed)
}
