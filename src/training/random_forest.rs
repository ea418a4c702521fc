//! Random forest classifier

use super::decision_tree::{Criterion, DecisionTree};
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Maximum features per split (sqrt by default)
    pub max_features: MaxFeatures,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: Option<u64>,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Sorted class labels
    classes: Vec<i64>,
}

/// Features drawn at each split
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// Square root of n_features
    #[default]
    Sqrt,
    /// All features
    All,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new_classifier(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new_classifier(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            criterion: Criterion::Gini,
            random_state: None,
            feature_importances: None,
            n_features: 0,
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
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set impurity criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(PipelineError::ValidationError(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        self.n_features = n_features;
        let max_features = self.compute_max_features(n_features);

        let mut classes: Vec<i64> = y.iter().map(|v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;

        // Each tree gets its own seed so parallel fitting stays reproducible
        let base_seed = self.random_state.unwrap_or(42);

        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let x_fit = x.select(ndarray::Axis(0), &sample_indices);
                let y_fit = Array1::from_iter(sample_indices.iter().map(|&i| y[i]));

                let mut tree = DecisionTree::new_classifier()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_criterion(self.criterion)
                    .with_random_state(rng.next_u64());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.max_features = Some(max_features);

                tree.fit(&x_fit, &y_fit)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total_importances[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Vote share of each class (columns in [`Self::classes`] order)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let n_samples = x.nrows();
        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((n_samples, n_classes));

        for preds in &all_predictions {
            for (i, &p) in preds.iter().enumerate() {
                if let Ok(class_idx) = self.classes.binary_search(&(p.round() as i64)) {
                    proba[[i, class_idx]] += 1.0;
                }
            }
        }
        proba /= all_predictions.len() as f64;

        Ok(proba)
    }

    /// Majority vote; ties resolve to the smaller class label
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        let predictions = proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                self.classes.get(best).copied().unwrap_or(0) as f64
            })
            .collect::<Vec<f64>>();

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

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 5.0, 0.3],
            [0.1, 3.0, 0.1],
            [0.2, 4.0, 0.7],
            [0.3, 1.0, 0.2],
            [1.0, 2.0, 0.9],
            [1.1, 5.0, 0.4],
            [1.2, 1.0, 0.6],
            [1.3, 3.0, 0.8],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = separable();
        let mut rf = RandomForest::new_classifier(25)
            .with_max_features(MaxFeatures::All)
            .with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        assert_eq!(predictions, y);
        assert_eq!(rf.n_trees(), 25);
        assert_eq!(rf.classes(), &[0, 1]);
    }

    #[test]
    fn test_feature_importances_rank_signal_first() {
        let (x, y) = separable();
        let mut rf = RandomForest::new_classifier(50)
            .with_max_features(MaxFeatures::All)
            .with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let imp = rf.feature_importances().unwrap();
        assert!((imp.sum() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[1]);
        assert!(imp[0] > imp[2]);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = separable();
        let mut rf = RandomForest::new_classifier(10).with_random_state(7);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (8, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let mut a = RandomForest::new_classifier(10).with_random_state(3);
        let mut b = RandomForest::new_classifier(10).with_random_state(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_entropy_criterion_three_classes() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        let mut rf = RandomForest::new_classifier(30)
            .with_criterion(Criterion::Entropy)
            .with_random_state(11);
        rf.fit(&x, &y).unwrap();

        assert_eq!(rf.classes(), &[0, 1, 2]);
        let proba = rf.predict_proba(&array![[0.0], [4.0], [8.0]]).unwrap();
        assert!(proba[[0, 0]] > 0.5);
        assert!(proba[[1, 1]] > 0.5);
        assert!(proba[[2, 2]] > 0.5);
    }

    #[test]
    fn test_predict_before_fit() {
        let rf = RandomForest::new_classifier(5);
        assert!(matches!(rf.predict(&array![[1.0]]), Err(PipelineError::ModelNotFitted)));
    }
}
