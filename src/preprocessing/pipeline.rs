//! Data preprocessing stage

use super::encoder::LabelEncoders;
use super::feature_selection::FeatureSelector;
use super::skew::correct_skew;
use crate::config::{PipelineConfig, PipelinePaths, ProcessingConfig, RANDOM_STATE, TARGET_COLUMN};
use crate::error::{PipelineError, Result, Stage};
use crate::synthetic::{Sampler, SMOTE};
use crate::utils::{self, array_to_frame, column_to_array1, columns_to_array2, DataLoader, DataSaver};
use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;
use tracing::{error, info};

/// Which partition a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Encoders are fitted on this partition
    Train,
    /// Encoded with the train-fitted encoders
    Test,
}

fn preprocessing_error(message: &str, e: PipelineError) -> PipelineError {
    error!(error = %e, "{message}");
    PipelineError::stage(Stage::Preprocessing, message, e)
}

/// Turns the raw train/test files into model-ready files
pub struct DataPreprocessor {
    config: ProcessingConfig,
    paths: PipelinePaths,
    encoders: Option<LabelEncoders>,
}

impl DataPreprocessor {
    /// Create the stage and make sure the processed directory exists
    pub fn new(config: &PipelineConfig, paths: PipelinePaths) -> Result<Self> {
        utils::ensure_dir(&paths.processed_dir)
            .map_err(|e| preprocessing_error("Failed to create processed directory", e))?;

        Ok(Self {
            config: config.data_processing.clone(),
            paths,
            encoders: None,
        })
    }

    /// Encoders fitted by the last train-partition call
    pub fn encoders(&self) -> Option<&LabelEncoders> {
        self.encoders.as_ref()
    }

    /// Drop identifiers and duplicates, label-encode, correct skew
    pub fn preprocess_data(&mut self, df: DataFrame, partition: Partition) -> Result<DataFrame> {
        info!(?partition, rows = df.height(), "Starting data preprocessing");
        self.preprocess_inner(df, partition)
            .map_err(|e| preprocessing_error("Error during the data preprocessing", e))
    }

    fn preprocess_inner(&mut self, mut df: DataFrame, partition: Partition) -> Result<DataFrame> {
        info!("Dropping the columns");
        for name in &self.config.drop_columns {
            if df.get_column_index(name).is_some() {
                df = df.drop(name)?;
            }
        }
        let before = df.height();
        df = df.lazy().unique_stable(None, UniqueKeepStrategy::First).collect()?;
        info!(removed = before - df.height(), "Dropped duplicate rows");

        for name in self.config.categorical_columns.iter().chain(&self.config.numerical_columns) {
            if df.get_column_index(name).is_none() {
                return Err(PipelineError::ColumnNotFound(name.clone()));
            }
        }

        info!("Encoding categorical columns using label encoding");
        if partition == Partition::Train {
            let encoders = LabelEncoders::fit(&df, &self.config.categorical_columns)?;
            encoders.save(&self.paths.encoders_file)?;
            info!(path = %self.paths.encoders_file.display(), "Label encoders saved");
            self.encoders = Some(encoders);
        }
        let encoders = self.encoders.as_ref().ok_or_else(|| {
            PipelineError::ValidationError("Label encoders must be fitted on the train partition first".to_string())
        })?;
        for (column, encoder) in encoders.iter() {
            info!(column = %column, mapping = ?encoder.mapping(), "Label mapping");
        }
        let mut df = encoders.transform(&df)?;

        info!("Handling skewness in numerical columns using log1p transformation");
        let transformed = correct_skew(&mut df, &self.config.numerical_columns, self.config.skewness_threshold)?;
        info!(columns = ?transformed, "Applied log1p");

        Ok(df)
    }

    /// Oversample every class to the majority size with SMOTE
    pub fn balance_data(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Balancing the dataset using SMOTE");
        Self::balance_inner(df).map_err(|e| preprocessing_error("Error during the data balancing", e))
    }

    fn balance_inner(df: &DataFrame) -> Result<DataFrame> {
        let features = utils::feature_names(df, TARGET_COLUMN);
        let x = columns_to_array2(df, &features)?;
        let y: Array1<i64> = column_to_array1(df, TARGET_COLUMN)?.mapv(|v| v.round() as i64);

        let result = SMOTE::new().with_seed(RANDOM_STATE).fit_resample(&x, &y)?;
        info!(
            rows = result.y.len(),
            synthetic = ?result.n_synthetic,
            "Successfully balanced the dataset"
        );

        array_to_frame(&result.x, &features, &result.y, TARGET_COLUMN)
    }

    /// Keep the top-ranked features plus the target
    pub fn select_features(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Selecting important features using random forest");
        self.select_inner(df)
            .map_err(|e| preprocessing_error("Error during the feature selection process", e))
    }

    fn select_inner(&self, df: &DataFrame) -> Result<DataFrame> {
        let features = utils::feature_names(df, TARGET_COLUMN);
        let x = columns_to_array2(df, &features)?;
        let y = column_to_array1(df, TARGET_COLUMN)?;

        let mut selector = FeatureSelector::new(self.config.no_of_features)
            .with_random_state(RANDOM_STATE)
            .with_feature_names(features);
        selector.fit(&x, &y)?;

        let mut columns = selector.selected_names().ok_or(PipelineError::ModelNotFitted)?;
        info!(features = ?columns, "Features selected");
        columns.push(TARGET_COLUMN.to_string());

        Ok(df.select(columns)?)
    }

    /// Write a frame as CSV without an index, overwriting
    pub fn save_data(&self, df: &mut DataFrame, path: &Path) -> Result<()> {
        info!("Saving processed data in the processed folder");
        DataSaver::save_csv(df, path)
            .map_err(|e| preprocessing_error("Error during the data saving process", e))?;
        info!(path = %path.display(), "Processed data saved");
        Ok(())
    }

    fn process_inner(&mut self) -> Result<()> {
        info!("Loading data from raw directory");
        let loader = DataLoader::new();
        let train = loader.load_csv(&self.paths.train_file)?;
        let test = loader.load_csv(&self.paths.test_file)?;

        let train = self.preprocess_data(train, Partition::Train)?;
        let test = self.preprocess_data(test, Partition::Test)?;

        let train = self.balance_data(&train)?;
        let test = self.balance_data(&test)?;

        let mut train = self.select_features(&train)?;
        let mut test = test.select(train.get_column_names_str())?;

        let processed_train = self.paths.processed_train_file.clone();
        let processed_test = self.paths.processed_test_file.clone();
        self.save_data(&mut train, &processed_train)?;
        self.save_data(&mut test, &processed_test)?;
        Ok(())
    }

    /// Run every preprocessing step on the raw train/test files
    pub fn process(&mut self) -> Result<()> {
        self.process_inner().map_err(|e| {
            error!(error = %e, "Error in the data preprocessing pipeline");
            PipelineError::stage(Stage::Preprocessing, "Error during the data preprocessing pipeline", e)
        })?;
        info!("Data preprocessing completed successfully");
        Ok(())
    }
}
