//! Pipeline configuration
//!
//! The configuration document is YAML with one section per stage:
//!
//! ```yaml
//! data_ingestion:
//!   bucket_name: reservations-raw
//!   bucket_file_name: Hotel_Reservations.csv
//!   train_ratio: 0.8
//! data_processing:
//!   categorical_columns: [type_of_meal_plan, booking_status]
//!   numerical_columns: [lead_time, avg_price_per_room]
//!   skewness_threshold: 5
//!   no_of_features: 10
//! ```
//!
//! It is loaded once and handed to every stage by reference.

mod paths;

pub use paths::PipelinePaths;

use crate::error::{PipelineError, Result};
use crate::training::{Criterion, MaxFeatures};
use crate::utils::read_yaml;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the binary target column. Not configurable.
pub const TARGET_COLUMN: &str = "booking_status";

/// Seed shared by splitting, balancing and feature selection
pub const RANDOM_STATE: u64 = 42;

/// Default location of the configuration document
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Default object store endpoint
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_ingestion: IngestionConfig,
    pub data_processing: ProcessingConfig,
    #[serde(default)]
    pub model_training: ModelParams,
}

/// Where the raw dataset lives and how to split it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Bucket holding the raw dataset
    pub bucket_name: String,
    /// Object name inside the bucket
    pub bucket_file_name: String,
    /// Fraction of rows that go to the train partition
    pub train_ratio: f64,
    /// Object store endpoint; `file://` selects a local mirror
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Column roles and thresholds for preprocessing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Columns label-encoded to dense integer codes
    pub categorical_columns: Vec<String>,
    /// Columns checked for skew and log1p-transformed above the threshold
    pub numerical_columns: Vec<String>,
    /// Sample skewness above which a column is log1p-transformed
    pub skewness_threshold: f64,
    /// Number of top-ranked features kept after selection
    pub no_of_features: usize,
    /// Identifier columns removed before encoding
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
}

fn default_drop_columns() -> Vec<String> {
    vec!["Unnamed: 0".to_string(), "Booking_ID".to_string()]
}

/// Random forest hyperparameters for the final classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// `sqrt` or `all`
    pub max_features: MaxFeatures,
    /// `gini` or `entropy`
    pub criterion: Criterion,
    pub random_state: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            criterion: Criterion::Gini,
            random_state: RANDOM_STATE,
        }
    }
}

impl PipelineConfig {
    /// Read and validate the YAML configuration at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: PipelineConfig = read_yaml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let ingestion = &self.data_ingestion;
        if ingestion.bucket_name.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "data_ingestion.bucket_name must not be empty".to_string(),
            ));
        }
        if ingestion.bucket_file_name.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "data_ingestion.bucket_file_name must not be empty".to_string(),
            ));
        }
        if !(ingestion.train_ratio > 0.0 && ingestion.train_ratio < 1.0) {
            return Err(PipelineError::ConfigError(format!(
                "data_ingestion.train_ratio must be in (0, 1), got {}",
                ingestion.train_ratio
            )));
        }

        let processing = &self.data_processing;
        if !processing.skewness_threshold.is_finite() {
            return Err(PipelineError::ConfigError(
                "data_processing.skewness_threshold must be finite".to_string(),
            ));
        }
        if processing.no_of_features == 0 {
            return Err(PipelineError::ConfigError(
                "data_processing.no_of_features must be at least 1".to_string(),
            ));
        }
        if processing.categorical_columns.is_empty() && processing.numerical_columns.is_empty() {
            return Err(PipelineError::ConfigError(
                "data_processing needs at least one categorical or numerical column".to_string(),
            ));
        }

        let params = &self.model_training;
        if params.n_estimators == 0 {
            return Err(PipelineError::ConfigError(
                "model_training.n_estimators must be at least 1".to_string(),
            ));
        }
        if params.min_samples_split < 2 {
            return Err(PipelineError::ConfigError(
                "model_training.min_samples_split must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
data_ingestion:
  bucket_name: reservations-raw
  bucket_file_name: Hotel_Reservations.csv
  train_ratio: 0.8
data_processing:
  categorical_columns:
    - type_of_meal_plan
    - booking_status
  numerical_columns:
    - lead_time
    - avg_price_per_room
  skewness_threshold: 5
  no_of_features: 10
"#;

    #[test]
    fn test_parse_minimal_document() {
        let config = PipelineConfig::from_yaml_str(YAML).unwrap();

        assert_eq!(config.data_ingestion.bucket_name, "reservations-raw");
        assert_eq!(config.data_ingestion.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.data_processing.no_of_features, 10);
        assert_eq!(config.data_processing.skewness_threshold, 5.0);
        assert_eq!(config.data_processing.drop_columns, vec!["Unnamed: 0", "Booking_ID"]);
        assert_eq!(config.model_training, ModelParams::default());
    }

    #[test]
    fn test_partial_model_section() {
        let yaml = format!("{YAML}model_training:\n  n_estimators: 25\n  max_depth: 8\n");
        let config = PipelineConfig::from_yaml_str(&yaml).unwrap();

        assert_eq!(config.model_training.n_estimators, 25);
        assert_eq!(config.model_training.max_depth, Some(8));
        assert_eq!(config.model_training.random_state, RANDOM_STATE);
        assert_eq!(config.model_training.criterion, Criterion::Gini);
    }

    #[test]
    fn test_forest_options_parse_lowercase() {
        let yaml = format!("{YAML}model_training:\n  criterion: entropy\n  max_features: all\n");
        let config = PipelineConfig::from_yaml_str(&yaml).unwrap();

        assert_eq!(config.model_training.criterion, Criterion::Entropy);
        assert_eq!(config.model_training.max_features, MaxFeatures::All);

        let bad = format!("{YAML}model_training:\n  criterion: mse\n");
        assert!(PipelineConfig::from_yaml_str(&bad).is_err());
    }

    #[test]
    fn test_rejects_ratio_out_of_range() {
        let yaml = YAML.replace("train_ratio: 0.8", "train_ratio: 1.0");
        let err = PipelineConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_zero_features() {
        let yaml = YAML.replace("no_of_features: 10", "no_of_features: 0");
        assert!(PipelineConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = PipelineConfig::from_yaml_str("data_ingestion: {}\n").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }
}
