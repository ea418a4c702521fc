//! Reservation pipeline - training pipeline for hotel booking cancellation
//!
//! Downloads the raw reservations dataset, splits it, preprocesses and
//! balances it, selects features and trains a random forest classifier.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration and the artifact file layout
//! - [`ingestion`] - Object store download and train/test split
//! - [`preprocessing`] - Encoding, skew correction, feature selection
//! - [`synthetic`] - SMOTE class balancing
//! - [`training`] - Decision trees, random forest, model training stage
//! - [`pipeline`] - The three stages run in order
//! - [`cli`] - Command-line interface
//! - [`logging`] - Tracing subscriber setup

// Core error handling
pub mod error;
pub mod config;

// Stages
pub mod ingestion;
pub mod preprocessing;
pub mod synthetic;
pub mod training;
pub mod pipeline;

// Utilities
pub mod utils;
pub mod logging;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{PipelineConfig, PipelinePaths};
    pub use crate::error::{PipelineError, Result, Stage};
    pub use crate::ingestion::{store_from_endpoint, DataIngestion, GcsStore, LocalStore, ObjectStore};
    pub use crate::pipeline::{PipelineReport, TrainingPipeline};
    pub use crate::preprocessing::{DataPreprocessor, LabelEncoders};
    pub use crate::synthetic::{Sampler, SMOTE};
    pub use crate::training::{ModelArtifact, ModelMetrics, ModelTrainer, RandomForest};
}
