//! End-to-end training pipeline

use crate::config::{PipelineConfig, PipelinePaths};
use crate::error::Result;
use crate::ingestion::{DataIngestion, ObjectStore, SplitSummary};
use crate::preprocessing::DataPreprocessor;
use crate::training::{ModelMetrics, ModelTrainer};
use crate::utils::Timer;
use tracing::info;

/// What a full run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub split: SplitSummary,
    pub metrics: ModelMetrics,
    pub elapsed_secs: f64,
}

/// Runs ingestion, preprocessing and training in order.
///
/// Stages hand data to each other through the files in [`PipelinePaths`];
/// the first failing stage aborts the run.
pub struct TrainingPipeline<S> {
    config: PipelineConfig,
    paths: PipelinePaths,
    store: S,
}

impl<S: ObjectStore> TrainingPipeline<S> {
    pub fn new(config: PipelineConfig, paths: PipelinePaths, store: S) -> Self {
        Self { config, paths, store }
    }

    pub async fn run(self) -> Result<PipelineReport> {
        let timer = Timer::start();
        info!(root = %self.paths.root.display(), "Training pipeline started");

        let split = DataIngestion::new(&self.config, self.paths.clone(), self.store)?
            .run()
            .await?;

        DataPreprocessor::new(&self.config, self.paths.clone())?.process()?;

        let metrics = ModelTrainer::new(self.paths.clone(), self.config.model_training.clone()).run()?;

        let elapsed_secs = timer.elapsed_secs();
        info!(secs = elapsed_secs, "Training pipeline completed");

        Ok(PipelineReport {
            split,
            metrics,
            elapsed_secs,
        })
    }
}
