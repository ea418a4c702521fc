//! Seeded row-wise train/test partitioning

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of (train, test) rows for `n_rows` at `train_ratio`.
///
/// The test share is rounded up, the train partition takes the rest.
pub fn split_sizes(n_rows: usize, train_ratio: f64) -> Result<(usize, usize)> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(PipelineError::ValidationError(format!(
            "train_ratio must be in (0, 1), got {train_ratio}"
        )));
    }

    let n_test = ((1.0 - train_ratio) * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);

    if n_train == 0 || n_test == 0 {
        return Err(PipelineError::ValidationError(format!(
            "With {n_rows} rows and train_ratio={train_ratio} one partition would be empty"
        )));
    }
    Ok((n_train, n_test))
}

/// Shuffle the rows of `df` with `seed` and cut them into (train, test)
pub fn train_test_split(df: &DataFrame, train_ratio: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    let n_rows = df.height();
    let (n_train, n_test) = split_sizes(n_rows, train_ratio)?;

    let mut permutation: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), permutation[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), permutation[n_test..n_test + n_train].to_vec());

    let train = df.take(&train_idx)?;
    let test = df.take(&test_idx)?;
    Ok((train, test))
}
