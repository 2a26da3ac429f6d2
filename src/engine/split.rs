// src/engine/split.rs

//! Seeded train/holdout partitioning.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{EngineError, Result};

/// Row-index partition of a dataset into training and holdout sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSplit {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Partition `total` rows into train and holdout sets.
///
/// Rows are shuffled with an RNG seeded from `seed`, then the first
/// `ceil(total * holdout_fraction)` shuffled rows become the holdout set;
/// the partition is identical across runs for a fixed input. Fails when
/// either side would come out empty.
pub fn holdout_split(total: usize, holdout_fraction: f64, seed: u64) -> Result<DataSplit> {
    let holdout_len = (total as f64 * holdout_fraction).ceil() as usize;
    if holdout_len == 0 || holdout_len >= total {
        return Err(EngineError::NotEnoughSamples { total });
    }

    let mut rows: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    Ok(DataSplit {
        holdout: rows[..holdout_len].to_vec(),
        train: rows[holdout_len..].to_vec(),
    })
}
