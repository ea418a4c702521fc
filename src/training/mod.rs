//! Model training module
//!
//! - Decision trees and random forests (classification)
//! - Evaluation metrics
//! - The training stage that fits, evaluates and persists the final model

mod models;
mod trainer;
pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use models::{ModelMetrics, POSITIVE_CLASS};
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{ModelArtifact, ModelTrainer};
