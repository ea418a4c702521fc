//! Final model training stage

use super::models::ModelMetrics;
use super::random_forest::RandomForest;
use crate::config::{ModelParams, PipelinePaths, TARGET_COLUMN};
use crate::error::{PipelineError, Result, Stage};
use crate::utils::{self, column_to_array1, columns_to_array2, DataLoader, Timer};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// Persisted output of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Feature columns in the order the model expects them
    pub feature_names: Vec<String>,
    /// Target column name
    pub target: String,
    pub model: RandomForest,
    pub metrics: ModelMetrics,
}

impl ModelArtifact {
    /// Write the artifact as JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            utils::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load an artifact written by [`ModelArtifact::save`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Score a frame using the stored feature order
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = columns_to_array2(df, &self.feature_names)?;
        self.model.predict(&x)
    }
}

/// Fits and evaluates the cancellation classifier
pub struct ModelTrainer {
    paths: PipelinePaths,
    params: ModelParams,
}

impl ModelTrainer {
    pub fn new(paths: PipelinePaths, params: ModelParams) -> Self {
        Self { paths, params }
    }

    /// Load a processed partition and split it into features and target
    fn load_partition(path: &Path, feature_names: Option<&[String]>) -> Result<(Vec<String>, Array2<f64>, Array1<f64>)> {
        let df = DataLoader::new().load_csv(path)?;
        let names = utils::feature_names(&df, TARGET_COLUMN);

        if let Some(expected) = feature_names {
            if names.as_slice() != expected {
                return Err(PipelineError::ValidationError(format!(
                    "{} columns {:?} do not match training features {:?}",
                    path.display(),
                    names,
                    expected
                )));
            }
        }

        let x = columns_to_array2(&df, &names)?;
        let y = column_to_array1(&df, TARGET_COLUMN)?;
        Ok((names, x, y))
    }

    fn build_model(&self) -> RandomForest {
        let mut model = RandomForest::new_classifier(self.params.n_estimators)
            .with_min_samples_split(self.params.min_samples_split)
            .with_min_samples_leaf(self.params.min_samples_leaf)
            .with_max_features(self.params.max_features)
            .with_criterion(self.params.criterion)
            .with_random_state(self.params.random_state);
        if let Some(depth) = self.params.max_depth {
            model = model.with_max_depth(depth);
        }
        model
    }

    fn train(&self) -> Result<ModelArtifact> {
        let (feature_names, x_train, y_train) = Self::load_partition(&self.paths.processed_train_file, None)?;
        info!(
            rows = x_train.nrows(),
            features = feature_names.len(),
            "Loaded processed train data"
        );
        let (_, x_test, y_test) =
            Self::load_partition(&self.paths.processed_test_file, Some(&feature_names))?;
        info!(rows = x_test.nrows(), "Loaded processed test data");

        let timer = Timer::start();
        let mut model = self.build_model();
        model.fit(&x_train, &y_train)?;
        let training_time_secs = timer.elapsed_secs();
        info!(
            n_estimators = model.n_trees(),
            secs = training_time_secs,
            "Random forest fitted"
        );

        let y_pred = model.predict(&x_test)?;
        let mut metrics = ModelMetrics::compute_classification(&y_test, &y_pred);
        metrics.training_time_secs = training_time_secs;
        metrics.n_features = feature_names.len();
        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1_score,
            "Model evaluated on test data"
        );

        let artifact = ModelArtifact {
            feature_names,
            target: TARGET_COLUMN.to_string(),
            model,
            metrics,
        };
        artifact.save(&self.paths.model_file)?;
        info!(path = %self.paths.model_file.display(), "Model saved");

        Ok(artifact)
    }

    /// Fit on processed train, evaluate on processed test, persist the artifact
    pub fn run(&self) -> Result<ModelMetrics> {
        info!("Starting model training");

        match self.train() {
            Ok(artifact) => {
                info!("Model training completed successfully");
                Ok(artifact.metrics)
            }
            Err(e) => {
                error!(error = %e, "Error while training the model");
                Err(PipelineError::stage(Stage::Training, "Failed to train the model", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{Criterion, MaxFeatures};
    use crate::utils::DataSaver;
    use polars::prelude::*;

    fn write_processed(paths: &PipelinePaths) {
        let lead: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let price: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64).collect();
        let status: Vec<i64> = (0..40).map(|i| i64::from(i >= 20)).collect();

        let mut train = df!(
            "lead_time" => &lead,
            "avg_price_per_room" => &price,
            "booking_status" => &status
        )
        .unwrap();
        let mut test = train.clone();

        DataSaver::save_csv(&mut train, &paths.processed_train_file).unwrap();
        DataSaver::save_csv(&mut test, &paths.processed_test_file).unwrap();
    }

    fn small_params() -> ModelParams {
        ModelParams {
            n_estimators: 10,
            ..ModelParams::default()
        }
    }

    #[test]
    fn test_run_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelinePaths::under(dir.path());
        write_processed(&paths);

        let metrics = ModelTrainer::new(paths.clone(), small_params()).run().unwrap();
        assert!(metrics.accuracy > 0.9);
        assert_eq!(metrics.n_samples, 40);
        assert_eq!(metrics.n_features, 2);

        let artifact = ModelArtifact::load(&paths.model_file).unwrap();
        assert_eq!(artifact.feature_names, vec!["lead_time", "avg_price_per_room"]);
        assert_eq!(artifact.target, "booking_status");
        assert_eq!(artifact.model.n_trees(), 10);

        let frame = DataLoader::new().load_csv(&paths.processed_test_file).unwrap();
        assert_eq!(artifact.predict(&frame).unwrap().len(), 40);
    }

    #[test]
    fn test_forest_options_reach_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelinePaths::under(dir.path());
        write_processed(&paths);

        let params = ModelParams {
            criterion: Criterion::Entropy,
            max_features: MaxFeatures::All,
            ..small_params()
        };
        ModelTrainer::new(paths.clone(), params).run().unwrap();

        let artifact = ModelArtifact::load(&paths.model_file).unwrap();
        assert_eq!(artifact.model.criterion, Criterion::Entropy);
        assert_eq!(artifact.model.max_features, MaxFeatures::All);
    }

    #[test]
    fn test_missing_processed_data_is_training_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelinePaths::under(dir.path());

        let err = ModelTrainer::new(paths, small_params()).run().unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Training));
        assert!(matches!(err.root_cause(), PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_mismatched_test_columns() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelinePaths::under(dir.path());
        write_processed(&paths);

        let mut other = df!("lead_time" => [1.0f64], "booking_status" => [0i64]).unwrap();
        DataSaver::save_csv(&mut other, &paths.processed_test_file).unwrap();

        let err = ModelTrainer::new(paths, small_params()).run().unwrap_err();
        assert!(matches!(err.root_cause(), PipelineError::ValidationError(_)));
    }
}
