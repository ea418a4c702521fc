//! Label encoding of categorical columns

use crate::error::{PipelineError, Result};
use crate::utils::ensure_dir;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Maps the distinct labels of one column to dense integer codes.
///
/// Classes are sorted ascending and a label's code is its rank. Labels
/// that all parse as numbers sort numerically, anything else sorts
/// lexically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

fn column_labels(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    as_str
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| {
                PipelineError::DataError(format!("null label in column {name} at row {row}"))
            })
        })
        .collect()
}

fn compare_labels(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) {
            // "1" and "1.0" are distinct labels; keep the order total
            return x
                .partial_cmp(&y)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b));
        }
    }
    a.cmp(b)
}

impl LabelEncoder {
    /// Learn the sorted set of labels
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        let numeric = classes.iter().all(|c| c.parse::<f64>().is_ok());
        classes.sort_by(|a, b| compare_labels(a, b, numeric));
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code of `label`, if it was seen during fit
    pub fn code(&self, label: &str) -> Option<i64> {
        self.classes.iter().position(|c| c == label).map(|i| i as i64)
    }

    /// label -> code, for logging and persistence
    pub fn mapping(&self) -> BTreeMap<String, i64> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as i64))
            .collect()
    }

    /// Encode `labels` of `column`; an unseen label is an error
    pub fn transform(&self, column: &str, labels: &[String]) -> Result<Vec<i64>> {
        let lookup: HashMap<&str, i64> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as i64))
            .collect();

        labels
            .iter()
            .map(|label| {
                lookup.get(label.as_str()).copied().ok_or_else(|| PipelineError::UnseenLabel {
                    column: column.to_string(),
                    label: label.clone(),
                })
            })
            .collect()
    }
}

/// One fitted [`LabelEncoder`] per categorical column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoders {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl LabelEncoders {
    /// Fit an encoder for each of `columns`
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let encoders = columns
            .iter()
            .map(|name| Ok((name.clone(), LabelEncoder::fit(&column_labels(df, name)?))))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { encoders })
    }

    /// Replace every fitted column with its Int64 codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for (name, encoder) in &self.encoders {
            let codes = encoder.transform(name, &column_labels(df, name)?)?;
            result.with_column(Column::new(name.as_str().into(), codes))?;
        }
        Ok(result)
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LabelEncoder)> {
        self.encoders.iter()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}
