//! Utility functions and types

pub mod data_loader;
pub mod frame;

pub use data_loader::{DataLoader, DataSaver};
pub use frame::{array_to_frame, column_to_array1, columns_to_array2, feature_names};

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::{Duration, Instant};

/// Read a YAML document into `T`
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let value = serde_yaml::from_reader(file)?;
    tracing::info!(path = %path.display(), "Successfully read the YAML file");
    Ok(value)
}

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        tracing::info!(dir = %dir.display(), "Created directory");
    }
    Ok(())
}

/// Simple wall-clock timer for stage logging
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
