//! Evaluation metrics for the cancellation classifier

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Label treated as the positive class for precision and recall
pub const POSITIVE_CLASS: f64 = 1.0;

/// Metrics for model evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute classification metrics for the positive class
    pub fn compute_classification(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let (tp, fp, tn, fn_) = confusion_counts(y_true, y_pred);
        let n = y_true.len();

        let accuracy = if n > 0 { (tp + tn) as f64 / n as f64 } else { 0.0 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1_score,
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fn_,
            n_samples: n,
            ..Self::default()
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

/// (tp, fp, tn, fn) with respect to [`POSITIVE_CLASS`]
fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_pos = (*t - POSITIVE_CLASS).abs() < 0.5;
        let p_pos = (*p - POSITIVE_CLASS).abs() < 0.5;

        match (t_pos, p_pos) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}
