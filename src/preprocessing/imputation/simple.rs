//! Simple Imputer.
//!
//! Imputation transformer for completing missing values with a per-column
//! statistic. `NaN` marks a missing value; the reconciler produces `NaN` for
//! every feature it could not resolve, so this is where those gaps get filled.
//!
//! # Example
//! ```
//! use cropcast::preprocessing::{FittedTransformer, ImputeStrategy, SimpleImputer, Transformer};
//! use ndarray::array;
//!
//! let data = array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0]];
//! let fitted = SimpleImputer::new(ImputeStrategy::Median).fit(&data).unwrap();
//! let imputed = fitted.transform(&data).unwrap();
//! assert_eq!(imputed[[0, 1]], 5.0);
//! ```

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for imputing missing values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace missing values with the mean of each column.
    Mean,
    /// Replace missing values with the median of each column.
    #[default]
    Median,
    /// Replace missing values with the most frequent value of each column.
    MostFrequent,
    /// Replace missing values with a constant value.
    Constant(f64),
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }
}

/// Statistic of one column, ignoring NaN values.
///
/// A column with no observed values falls back to 0.0.
fn column_statistic(column: ArrayView1<'_, f64>, strategy: &ImputeStrategy) -> f64 {
    if let ImputeStrategy::Constant(val) = strategy {
        return *val;
    }

    let mut observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        return 0.0;
    }

    match strategy {
        ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
        ImputeStrategy::Median => {
            observed.sort_by(f64::total_cmp);
            let n = observed.len();
            if n % 2 == 0 {
                (observed[n / 2 - 1] + observed[n / 2]) / 2.0
            } else {
                observed[n / 2]
            }
        }
        ImputeStrategy::MostFrequent => {
            let mut counts: HashMap<u64, usize> = HashMap::new();
            for v in &observed {
                *counts.entry(v.to_bits()).or_insert(0) += 1;
            }
            // Ties go to the smallest value.
            counts
                .into_iter()
                .map(|(bits, count)| (f64::from_bits(bits), count))
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.total_cmp(&a.0)))
                .map(|(value, _)| value)
                .unwrap_or(0.0)
        }
        ImputeStrategy::Constant(val) => *val,
    }
}

impl Transformer for SimpleImputer {
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit SimpleImputer on empty data".to_string(),
            ));
        }

        let statistics = data
            .axis_iter(Axis(1))
            .map(|column| column_statistic(column, &self.strategy))
            .collect();

        Ok(FittedSimpleImputer {
            strategy: self.strategy.clone(),
            statistics,
            n_features: data.ncols(),
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    statistics: Vec<f64>,
    n_features: usize,
}

impl FittedSimpleImputer {
    /// Fill values for each feature, in column order.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }
}

impl FittedTransformer for FittedSimpleImputer {
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        self.check_features(data)?;

        let mut result = data.to_owned();
        for ((_, col), value) in result.indexed_iter_mut() {
            if value.is_nan() {
                *value = self.statistics[col];
            }
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}
