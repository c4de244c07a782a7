use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::preprocessing::PreprocessingError;

/// Row indices of a shuffled holdout split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    /// Rows of `x` belonging to the training part.
    pub fn train_rows(&self, x: &Array2<f64>) -> Array2<f64> {
        x.select(Axis(0), &self.train)
    }

    pub fn test_rows(&self, x: &Array2<f64>) -> Array2<f64> {
        x.select(Axis(0), &self.test)
    }
}

/// Pick elements of `values` at `indices`.
pub fn take<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

/// Shuffle `0..n_rows` with a seeded RNG and hold out `ceil(n_rows * test_fraction)` rows.
///
/// At least one row lands on each side.
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, PreprocessingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PreprocessingError::InvalidParameter(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    if n_rows < 2 {
        return Err(PreprocessingError::EmptyData(format!(
            "need at least 2 rows to split, got {}",
            n_rows
        )));
    }

    let n_test = ((n_rows as f64 * test_fraction).ceil() as usize).clamp(1, n_rows - 1);

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_split_sizes_follow_fraction() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        // ceil keeps a non-empty holdout for small sets
        let split = train_test_split(3, 0.2, 42).unwrap();
        assert_eq!((split.train.len(), split.test.len()), (2, 1));
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(25, 0.2, 7).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        assert_eq!(
            train_test_split(50, 0.2, 42).unwrap(),
            train_test_split(50, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_tiny_data_and_bad_fraction() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
    }

    #[test]
    fn test_split_selects_rows() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let split = Split {
            train: vec![3, 1],
            test: vec![0],
        };
        assert_eq!(split.train_rows(&x), array![[3.0], [1.0]]);
        assert_eq!(split.test_rows(&x), array![[0.0]]);
        assert_eq!(take(&["a", "b", "c", "d"], &split.test), vec!["a"]);
    }
}
