//! Seeded train/test split

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Rows of one partition
#[derive(Debug, Clone)]
pub struct Partition {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

/// Shuffle row indices with a fixed seed and hold out `ceil(n * test_size)` rows.
///
/// The same seed over the same number of rows always yields the same split.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<(Partition, Partition)> {
    let n = x.nrows();
    if n != y.len() {
        return Err(Error::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::TrainingError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (n as f64 * test_size).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(Error::TrainingError(format!(
            "with n_samples={} and test_size={} the train or test partition would be empty",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let take = |idx: &[usize]| Partition {
        x: x.select(Axis(0), idx),
        y: y.select(Axis(0), idx),
    };

    Ok((take(train_idx), take(test_idx)))
}
