//! Data ingestion stage
//!
//! Fetches the raw dataset from an object store into `raw/raw.csv` and
//! splits it into `raw/train.csv` and `raw/test.csv`.

mod split;
mod store;

pub use split::{split_sizes, train_test_split};
pub use store::{store_from_endpoint, AnyStore, GcsStore, LocalStore, ObjectStore, GCS_TOKEN_ENV};

use crate::config::{IngestionConfig, PipelineConfig, PipelinePaths, RANDOM_STATE};
use crate::error::{PipelineError, Result, Stage};
use crate::utils::{ensure_dir, DataLoader, DataSaver};
use tracing::{error, info};

/// Row counts produced by [`DataIngestion::split`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Downloads and partitions the raw dataset
pub struct DataIngestion<S> {
    config: IngestionConfig,
    paths: PipelinePaths,
    store: S,
}

impl<S: ObjectStore> DataIngestion<S> {
    /// Create the stage and make sure the raw directory exists
    pub fn new(config: &PipelineConfig, paths: PipelinePaths, store: S) -> Result<Self> {
        ensure_dir(&paths.raw_dir).map_err(|e| {
            error!(error = %e, dir = %paths.raw_dir.display(), "Failed to create raw directory");
            PipelineError::stage(Stage::Ingestion, "Failed to create raw directory", e)
        })?;

        let config = config.data_ingestion.clone();
        info!(
            bucket = %config.bucket_name,
            file = %config.bucket_file_name,
            "Data ingestion started"
        );

        Ok(Self { config, paths, store })
    }

    /// Download the configured object to the raw file path
    pub async fn fetch(&self) -> Result<()> {
        self.store
            .fetch(&self.config.bucket_name, &self.config.bucket_file_name, &self.paths.raw_file)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    bucket = %self.config.bucket_name,
                    file = %self.config.bucket_file_name,
                    "Failed to download the raw file"
                );
                PipelineError::stage(Stage::Ingestion, "Error in downloading", e)
            })?;

        info!(path = %self.paths.raw_file.display(), "Raw file successfully downloaded");
        Ok(())
    }

    /// Split the raw file into train and test files
    pub fn split(&self) -> Result<SplitSummary> {
        info!("Splitting the dataset");

        self.split_inner().map_err(|e| {
            error!(error = %e, "Error while splitting the data");
            PipelineError::stage(Stage::Ingestion, "Failed to split the data in train and test", e)
        })
    }

    fn split_inner(&self) -> Result<SplitSummary> {
        let data = DataLoader::new().load_csv(&self.paths.raw_file)?;
        let (mut train, mut test) = train_test_split(&data, self.config.train_ratio, RANDOM_STATE)?;

        DataSaver::save_csv(&mut train, &self.paths.train_file)?;
        DataSaver::save_csv(&mut test, &self.paths.test_file)?;

        info!(path = %self.paths.train_file.display(), rows = train.height(), "Train file created");
        info!(path = %self.paths.test_file.display(), rows = test.height(), "Test file created");

        Ok(SplitSummary {
            total_rows: data.height(),
            train_rows: train.height(),
            test_rows: test.height(),
        })
    }

    /// Fetch then split. The completion log is emitted on every path.
    pub async fn run(&self) -> Result<SplitSummary> {
        info!("Data ingestion is started");

        let result = match self.fetch().await {
            Ok(()) => self.split(),
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(summary) => {
                info!(
                    total = summary.total_rows,
                    train = summary.train_rows,
                    test = summary.test_rows,
                    "Data ingestion completed successfully"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Error in the run method of data ingestion");
                Err(PipelineError::stage(Stage::Ingestion, "Data ingestion run failed", e))
            }
        };

        info!("Data ingestion is completed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelParams, ProcessingConfig};
    use std::fmt::Write as _;
    use std::path::Path;

    fn config(ratio: f64) -> PipelineConfig {
        PipelineConfig {
            data_ingestion: IngestionConfig {
                bucket_name: "bucket".to_string(),
                bucket_file_name: "reservations.csv".to_string(),
                train_ratio: ratio,
                endpoint: "file:///unused".to_string(),
            },
            data_processing: ProcessingConfig {
                categorical_columns: vec!["booking_status".to_string()],
                numerical_columns: vec![],
                skewness_threshold: 1.0,
                no_of_features: 1,
                drop_columns: vec![],
            },
            model_training: ModelParams::default(),
        }
    }

    fn seed_mirror(root: &Path, rows: usize) -> LocalStore {
        let store = LocalStore::new(root);
        let path = store.object_path("bucket", "reservations.csv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        let mut csv = String::from("Booking_ID,lead_time,booking_status\n");
        for i in 0..rows {
            let status = if i % 3 == 0 { "Canceled" } else { "Not_Canceled" };
            writeln!(csv, "INN{i:05},{},{status}", i * 2).unwrap();
        }
        std::fs::write(path, csv).unwrap();
        store
    }

    #[tokio::test]
    async fn test_run_splits_100_rows() {
        let mirror = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = seed_mirror(mirror.path(), 100);
        let paths = PipelinePaths::under(work.path());

        let ingestion = DataIngestion::new(&config(0.8), paths.clone(), store).unwrap();
        let summary = ingestion.run().await.unwrap();

        assert_eq!(summary, SplitSummary { total_rows: 100, train_rows: 80, test_rows: 20 });
        let loader = DataLoader::new();
        assert_eq!(loader.load_csv(&paths.train_file).unwrap().height(), 80);
        assert_eq!(loader.load_csv(&paths.test_file).unwrap().height(), 20);
        assert!(paths.raw_file.exists());
    }

    #[tokio::test]
    async fn test_missing_object_is_ingestion_error() {
        let mirror = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = LocalStore::new(mirror.path());

        let ingestion = DataIngestion::new(&config(0.8), PipelinePaths::under(work.path()), store).unwrap();
        let err = ingestion.run().await.unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Ingestion));
        assert!(matches!(err.root_cause(), PipelineError::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_split_without_raw_file_fails() {
        let mirror = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = LocalStore::new(mirror.path());

        let ingestion = DataIngestion::new(&config(0.8), PipelinePaths::under(work.path()), store).unwrap();
        let err = ingestion.split().unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Ingestion));
        assert!(matches!(err.root_cause(), PipelineError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_rerun_overwrites_outputs() {
        let mirror = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let store = seed_mirror(mirror.path(), 40);
        let paths = PipelinePaths::under(work.path());

        let ingestion = DataIngestion::new(&config(0.75), paths.clone(), store).unwrap();
        ingestion.run().await.unwrap();
        let first = std::fs::read(&paths.train_file).unwrap();
        ingestion.run().await.unwrap();
        let second = std::fs::read(&paths.train_file).unwrap();

        assert_eq!(first, second);
    }
}
