//! CSV loading and saving for the stage files

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// CSV loader used by every stage
pub struct DataLoader {
    /// Rows scanned for schema inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: None,
        }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        tracing::debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            "Loaded CSV"
        );
        Ok(df)
    }
}

/// Save DataFrames as CSV
pub struct DataSaver;

impl DataSaver {
    /// Write `df` to `path` with a header and no index, replacing any existing file
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)?;
        Ok(())
    }
}
