//! Conversions between polars frames and ndarray matrices

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| PipelineError::DataError(format!("null value in column {name} at row {row}")))
        })
        .collect()
}

/// Extract named columns into a row-major matrix. Nulls are an error.
pub fn columns_to_array2(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let columns = names
        .iter()
        .map(|name| column_f64(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((df.height(), names.len()), |(r, c)| columns[c][r]))
}

/// Extract one column as a float vector
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    column_f64(df, name).map(Array1::from_vec)
}

/// Every column name except `target`, in frame order
pub fn feature_names(df: &DataFrame, target: &str) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target)
        .map(|name| name.to_string())
        .collect()
}

/// Rebuild a frame from a feature matrix and an integer target column
pub fn array_to_frame(
    x: &Array2<f64>,
    feature_names: &[String],
    y: &Array1<i64>,
    target: &str,
) -> Result<DataFrame> {
    if x.ncols() != feature_names.len() || x.nrows() != y.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} rows x {} columns", y.len(), feature_names.len()),
            actual: format!("{} rows x {} columns", x.nrows(), x.ncols()),
        });
    }

    let mut columns: Vec<Column> = feature_names
        .iter()
        .enumerate()
        .map(|(j, name)| Column::new(name.as_str().into(), x.column(j).to_vec()))
        .collect();
    columns.push(Column::new(target.into(), y.to_vec()));

    Ok(DataFrame::new(columns)?)
}
