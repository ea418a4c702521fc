//! SMOTE oversampling

use crate::error::{PipelineError, Result};
use crate::synthetic::{class_counts, class_indices, ResampleResult, Sampler};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// SMOTE (Synthetic Minority Over-sampling Technique)
///
/// Every class is brought up to the size of the largest one by
/// interpolating between a sample and one of its k nearest same-class
/// neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SMOTE {
    /// Number of nearest neighbors
    k_neighbors: usize,
    /// Random seed
    seed: Option<u64>,
    /// Target samples per class
    target_counts: Option<BTreeMap<i64, usize>>,
}

impl SMOTE {
    /// Create new SMOTE sampler
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            seed: None,
            target_counts: None,
        }
    }

    /// Set number of neighbors
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).powi(2)).sum()
    }

    /// k nearest neighbours of every member, as positions within `members`.
    ///
    /// Ties are broken by position so the result does not depend on
    /// iteration order.
    fn neighbor_table(x: &Array2<f64>, members: &[usize], k: usize) -> Vec<Vec<usize>> {
        members
            .par_iter()
            .enumerate()
            .map(|(pos, &row)| {
                let mut dists: Vec<(f64, usize)> = members
                    .iter()
                    .enumerate()
                    .filter(|&(other, _)| other != pos)
                    .map(|(other, &other_row)| {
                        (Self::squared_distance(x.row(row), x.row(other_row)), other)
                    })
                    .collect();
                dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));
                dists.truncate(k);
                dists.into_iter().map(|(_, other)| other).collect()
            })
            .collect()
    }
}

impl Default for SMOTE {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SMOTE {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let counts = class_counts(y);
        if counts.len() < 2 {
            return Err(PipelineError::ValidationError(
                "Need at least 2 classes for SMOTE".to_string(),
            ));
        }

        let smallest = counts.values().copied().min().unwrap_or(0);
        if smallest < 2 {
            return Err(PipelineError::ValidationError(format!(
                "SMOTE needs at least 2 samples per class, smallest class has {smallest}"
            )));
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        self.target_counts = Some(counts.keys().map(|&class| (class, max_count)).collect());
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let targets = self
            .target_counts
            .as_ref()
            .ok_or_else(|| PipelineError::ValidationError("SMOTE not fitted".to_string()))?;

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let indices = class_indices(y);
        let n_features = x.ncols();

        let mut synthetic_x: Vec<f64> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();
        let mut n_synthetic = Vec::with_capacity(targets.len());

        for (&class, &target_count) in targets {
            let members = indices.get(&class).map(Vec::as_slice).unwrap_or(&[]);
            let n_to_generate = target_count.saturating_sub(members.len());
            n_synthetic.push(n_to_generate);

            if n_to_generate == 0 || members.is_empty() {
                continue;
            }

            let k = self.k_neighbors.min(members.len() - 1);
            if k == 0 {
                return Err(PipelineError::ValidationError(format!(
                    "Class {class} has too few samples for SMOTE"
                )));
            }
            let neighbors = Self::neighbor_table(x, members, k);

            for _ in 0..n_to_generate {
                let pos = rng.gen_range(0..members.len());
                let neighbor_pos = neighbors[pos][rng.gen_range(0..neighbors[pos].len())];
                let gap: f64 = rng.gen();

                let sample = x.row(members[pos]);
                let neighbor = x.row(members[neighbor_pos]);
                synthetic_x.extend(
                    sample.iter().zip(neighbor.iter()).map(|(&s, &n)| s + gap * (n - s)),
                );
                synthetic_y.push(class);
            }
        }

        // Original rows first, synthetic rows appended
        let n_original = x.nrows();
        let n_total = n_original + synthetic_y.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic_x[(i - n_original) * n_features + j]
            }
        });

        let mut all_y: Vec<i64> = y.iter().copied().collect();
        all_y.extend_from_slice(&synthetic_y);

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_imbalanced_data() -> (Array2<f64>, Array1<i64>) {
        // 20 majority around the origin, 5 minority around (10, 10)
        let mut data = Vec::new();
        let mut labels = Vec::new();

        for i in 0..20 {
            data.push((i % 5) as f64);
            data.push((i / 5) as f64);
            labels.push(0i64);
        }

        for i in 0..5 {
            data.push(10.0 + (i % 3) as f64);
            data.push(10.0 + (i / 3) as f64);
            labels.push(1i64);
        }

        let x = Array2::from_shape_vec((25, 2), data).unwrap();
        let y = Array1::from_vec(labels);

        (x, y)
    }

    #[test]
    fn test_smote_balances_classes() {
        let (x, y) = create_imbalanced_data();

        let mut smote = SMOTE::new().with_k_neighbors(3).with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        let counts = class_counts(&result.y);
        assert_eq!(counts[&0], 20);
        assert_eq!(counts[&1], 20);
        assert_eq!(result.x.nrows(), 40);
        assert_eq!(result.n_synthetic, vec![0, 15]);
    }

    #[test]
    fn test_smote_preserves_original() {
        let (x, y) = create_imbalanced_data();
        let mut smote = SMOTE::new().with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        for i in 0..x.nrows() {
            for j in 0..x.ncols() {
                assert_eq!(result.x[[i, j]], x[[i, j]]);
            }
            assert_eq!(result.y[i], y[i]);
        }
    }

    #[test]
    fn test_synthetic_rows_lie_in_minority_hull() {
        let (x, y) = create_imbalanced_data();
        let mut smote = SMOTE::new().with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        for i in x.nrows()..result.x.nrows() {
            assert_eq!(result.y[i], 1);
            assert!((10.0..=12.0).contains(&result.x[[i, 0]]));
            assert!((10.0..=11.0).contains(&result.x[[i, 1]]));
        }
    }

    #[test]
    fn test_smote_is_reproducible() {
        let (x, y) = create_imbalanced_data();
        let a = SMOTE::new().with_seed(42).fit_resample(&x, &y).unwrap();
        let b = SMOTE::new().with_seed(42).fit_resample(&x, &y).unwrap();

        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn test_smote_single_class_fails() {
        let x = Array2::zeros((4, 2));
        let y = Array1::from_vec(vec![1i64; 4]);
        assert!(SMOTE::new().fit_resample(&x, &y).is_err());
    }

    #[test]
    fn test_smote_tiny_class_fails() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 9.0]).unwrap();
        let y = Array1::from_vec(vec![0i64, 0, 0, 1]);
        assert!(SMOTE::new().fit_resample(&x, &y).is_err());
    }

    #[test]
    fn test_resample_before_fit() {
        let (x, y) = create_imbalanced_data();
        assert!(SMOTE::new().resample(&x, &y).is_err());
    }
}
