//! Data preprocessing module
//!
//! - Identifier and duplicate removal
//! - Label encoding of categorical columns
//! - Skew correction with log1p
//! - Class balancing (see [`crate::synthetic`])
//! - Random forest feature selection

mod encoder;
mod pipeline;
pub mod feature_selection;
pub mod skew;

pub use encoder::{LabelEncoder, LabelEncoders};
pub use feature_selection::FeatureSelector;
pub use pipeline::{DataPreprocessor, Partition};
pub use skew::{column_skewness, correct_skew, skewness};
