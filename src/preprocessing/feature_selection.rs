//! Feature selection by random forest importance

use crate::error::{PipelineError, Result};
use crate::training::RandomForest;
use ndarray::{Array1, Array2};
use std::cmp::Ordering;

/// Ranks features by the impurity importance of a fitted forest and keeps
/// the top `k`.
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    k: usize,
    n_estimators: usize,
    random_state: u64,
    feature_names: Vec<String>,
    ranking: Option<Vec<usize>>,
}

impl FeatureSelector {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_estimators: 100,
            random_state: 42,
            feature_names: Vec::new(),
            ranking: None,
        }
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Fit the forest and rank features by descending importance.
    /// Equal importances keep their column order.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.k == 0 {
            return Err(PipelineError::ValidationError(
                "Number of features to select must be at least 1".to_string(),
            ));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != x.ncols() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", self.feature_names.len()),
            });
        }

        let mut forest = RandomForest::new_classifier(self.n_estimators).with_random_state(self.random_state);
        forest.fit(x, y)?;

        let scores: Vec<f64> = forest
            .feature_importances()
            .map(|imp| imp.to_vec())
            .ok_or(PipelineError::ModelNotFitted)?;

        let mut ranking: Vec<usize> = (0..scores.len()).collect();
        ranking.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        self.ranking = Some(ranking);
        Ok(())
    }

    /// Indices of the selected features, most important first
    pub fn selected_indices(&self) -> Option<&[usize]> {
        self.ranking.as_deref().map(|r| &r[..self.k.min(r.len())])
    }

    /// Names of the selected features, most important first
    pub fn selected_names(&self) -> Option<Vec<String>> {
        let indices = self.selected_indices()?;
        indices
            .iter()
            .map(|&i| self.feature_names.get(i).cloned())
            .collect()
    }

    /// All feature indices, most important first
    pub fn ranking(&self) -> Option<&[usize]> {
        self.ranking.as_deref()
    }
}
