//! Decision tree classifier

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decision tree node. Children are indices into the tree's node table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node predicting a class label
    Leaf { value: f64, n_samples: usize },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Gini impurity
    #[default]
    Gini,
    /// Entropy
    Entropy,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node table, root at index 0
    nodes: Vec<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn at random for each split; `None` tries all
    pub max_features: Option<usize>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Seed for the per-split feature draw
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Sorted class labels
    classes: Vec<i64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new_classifier() -> Self {
        Self {
            nodes: Vec::new(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: None,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree to training data. `y` holds integral class labels.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::ValidationError(format!(
                "Cannot fit a tree on {n_samples} samples x {n_features} features"
            )));
        }

        let mut classes: Vec<i64> = y.iter().map(|v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        let y_idx: Vec<usize> = y
            .iter()
            .map(|v| classes.binary_search(&(v.round() as i64)).unwrap_or(0))
            .collect();

        self.n_features = n_features;
        self.classes = classes;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        let mut importances = vec![0.0; n_features];
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..n_samples).collect();
        self.build_node(x, &y_idx, indices, 0, &mut importances, &mut rng, &mut nodes);
        self.nodes = nodes;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: Vec<usize>,
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
        nodes: &mut Vec<TreeNode>,
    ) -> usize {
        let n_samples = indices.len();
        let counts = self.class_counts(y, &indices);
        let leaf = TreeNode::Leaf {
            value: self.majority_class(&counts),
            n_samples,
        };

        let id = nodes.len();
        nodes.push(leaf);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || pure;
        if should_stop {
            return id;
        }

        let parent_impurity = self.impurity(&counts, n_samples);
        let Some(best) = self.find_best_split(x, y, &indices, &counts, parent_impurity, rng) else {
            return id;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] += n_samples as f64 * best.gain;

        let left = self.build_node(x, y, left_indices, depth + 1, importances, rng, nodes);
        let right = self.build_node(x, y, right_indices, depth + 1, importances, rng, nodes);

        nodes[id] = TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        };
        id
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        indices: &[usize],
        parent_counts: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = x.ncols();
        let n_try = self.max_features.unwrap_or(n_features).clamp(1, n_features);
        let candidates: Vec<usize> = if n_try < n_features {
            let mut drawn = index::sample(rng, n_features, n_try).into_vec();
            drawn.sort_unstable();
            drawn
        } else {
            (0..n_features).collect()
        };

        let n = indices.len();
        let n_classes = self.classes.len();

        // Each candidate feature is scanned independently over its sorted values
        let results: Vec<Option<SplitCandidate>> = candidates
            .par_iter()
            .map(|&feature_idx| {
                let mut sorted: Vec<(f64, usize)> =
                    indices.iter().map(|&i| (x[[i, feature_idx]], y[i])).collect();
                sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

                let mut left = vec![0usize; n_classes];
                let mut right = parent_counts.to_vec();
                let mut best: Option<SplitCandidate> = None;

                for pos in 0..n - 1 {
                    let (value, class) = sorted[pos];
                    left[class] += 1;
                    right[class] -= 1;

                    let next_value = sorted[pos + 1].0;
                    if next_value <= value {
                        continue;
                    }

                    let n_left = pos + 1;
                    let n_right = n - n_left;
                    if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                        continue;
                    }

                    let weighted = (n_left as f64 * self.impurity(&left, n_left)
                        + n_right as f64 * self.impurity(&right, n_right))
                        / n as f64;
                    let gain = parent_impurity - weighted;

                    if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                        best = Some(SplitCandidate {
                            feature_idx,
                            threshold: value + (next_value - value) / 2.0,
                            gain,
                        });
                    }
                }
                best
            })
            .collect();

        // Highest gain wins; ties go to the lower feature index
        results.into_iter().flatten().fold(None, |best, candidate| match best {
            Some(b) if b.gain >= candidate.gain => Some(b),
            _ => Some(candidate),
        })
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn impurity(&self, counts: &[usize], n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        match self.criterion {
            Criterion::Gini => {
                1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }

    /// Most frequent class; ties resolve to the smaller label
    fn majority_class(&self, counts: &[usize]) -> f64 {
        let mut best = 0;
        for (i, &c) in counts.iter().enumerate() {
            if c > counts[best] {
                best = i;
            }
        }
        self.classes.get(best).copied().unwrap_or(0) as f64
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let predictions: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let mut node = 0;
                loop {
                    match &self.nodes[node] {
                        TreeNode::Leaf { value, .. } => break *value,
                        TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                            node = if row[*feature_idx] <= *threshold { *left } else { *right };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Sorted class labels seen during fit
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.node_depth(0)
        }
    }

    fn node_depth(&self, node: usize) -> usize {
        match &self.nodes[node] {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + self.node_depth(*left).max(self.node_depth(*right))
            }
        }
    }
}
