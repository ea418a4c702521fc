//! Error types for the reservation training pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage that produced a wrapped error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Preprocessing,
    Training,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingestion => write!(f, "Data ingestion"),
            Stage::Preprocessing => write!(f, "Data preprocessing"),
            Stage::Training => write!(f, "Model training"),
        }
    }
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage entry point failed; carries the original cause
    #[error("{stage} error: {message}")]
    Stage {
        stage: Stage,
        message: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Object gs://{bucket}/{object} not found")]
    ObjectNotFound { bucket: String, object: String },

    #[error("Transfer of {object} failed: {reason}")]
    TransferError { object: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Unseen label {label:?} in column {column}")]
    UnseenLabel { column: String, label: String },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl PipelineError {
    /// Wrap `source` as a failure of `stage`
    pub fn stage(stage: Stage, message: impl Into<String>, source: PipelineError) -> Self {
        PipelineError::Stage {
            stage,
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Stage that failed, if this is a wrapped stage error
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost cause, unwrapping nested stage errors
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::TransferError {
            object: err
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_default(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = PipelineError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::IoError(_)));
    }

    #[test]
    fn test_stage_error_keeps_cause() {
        let cause = PipelineError::ColumnNotFound("lead_time".to_string());
        let err = PipelineError::stage(Stage::Preprocessing, "Error during the data preprocessing", cause);

        assert_eq!(err.failed_stage(), Some(Stage::Preprocessing));
        assert_eq!(
            err.to_string(),
            "Data preprocessing error: Error during the data preprocessing"
        );
        assert_eq!(err.source().map(|s| s.to_string()), Some("Column not found: lead_time".to_string()));
        assert!(matches!(err.root_cause(), PipelineError::ColumnNotFound(_)));
    }

    #[test]
    fn test_nested_stage_root_cause() {
        let inner = PipelineError::stage(
            Stage::Ingestion,
            "Failed to split the data in train and test",
            PipelineError::ValidationError("empty".to_string()),
        );
        let outer = PipelineError::stage(Stage::Ingestion, "run failed", inner);
        assert!(matches!(outer.root_cause(), PipelineError::ValidationError(_)));
    }
}
