//! Class balancing by synthetic oversampling
//!
//! - SMOTE (Synthetic Minority Over-sampling Technique)

mod smote;

pub use smote::SMOTE;

use crate::error::Result;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Result of resampling
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Resampled features
    pub x: Array2<f64>,
    /// Resampled labels
    pub y: Array1<i64>,
    /// Number of synthetic samples generated per class, in ascending class order
    pub n_synthetic: Vec<usize>,
}

/// Trait for samplers
pub trait Sampler: Send + Sync {
    /// Fit the sampler on data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Resample data
    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult>;

    /// Fit and resample in one step
    fn fit_resample(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.fit(x, y)?;
        self.resample(x, y)
    }
}

/// Class distribution, ordered by class label
pub fn class_counts(y: &Array1<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Row indices of each class, ordered by class label
pub fn class_indices(y: &Array1<i64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices.entry(label).or_insert_with(Vec::new).push(i);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_counts_sorted() {
        let y = array![1i64, 0, 1, 1, 2];
        let counts = class_counts(&y);
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(0, 1), (1, 3), (2, 1)]);
    }

    #[test]
    fn test_class_indices() {
        let y = array![1i64, 0, 1];
        let indices = class_indices(&y);
        assert_eq!(indices[&0], vec![1]);
        assert_eq!(indices[&1], vec![0, 2]);
    }
}
