//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the column mean of the training samples and `s` the population
//! standard deviation. Constant columns get `s = 1` so they pass through centred.

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// Center the data before scaling.
    pub with_mean: bool,
    /// Scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

impl Transformer for StandardScaler {
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, PreprocessingError> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }
        if data.iter().any(|v| v.is_nan()) {
            return Err(PreprocessingError::MissingValues(
                "StandardScaler requires imputed data".to_string(),
            ));
        }

        let mut mean = vec![0.0; cols];
        let mut std = vec![1.0; cols];

        for (j, column) in data.axis_iter(Axis(1)).enumerate() {
            let mu = column.sum() / rows as f64;
            if self.config.with_mean {
                mean[j] = mu;
            }
            if self.config.with_std {
                let variance = column.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / rows as f64;
                let sigma = variance.sqrt();
                std[j] = if sigma == 0.0 { 1.0 } else { sigma };
            }
        }

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            std,
            n_features: cols,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Vec<f64>,
    std: Vec<f64>,
    n_features: usize,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &[f64] {
        &self.std
    }
}

impl FittedTransformer for FittedStandardScaler {
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        self.check_features(data)?;

        let mut result = data.to_owned();
        for (j, mut column) in result.axis_iter_mut(Axis(1)).enumerate() {
            let (mu, sigma) = (self.mean[j], self.std[j]);
            column.mapv_inplace(|v| (v - mu) / sigma);
        }
        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler_zero_mean_unit_variance() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let scaled = fitted.transform(&data).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            let mean = column.sum() / 4.0;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_standard_scaler_population_std() {
        let data = array![[0.0], [2.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();

        assert_eq!(fitted.mean(), &[1.0]);
        assert_eq!(fitted.std(), &[1.0]);
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let data = array![[5.0, 1.0], [5.0, 3.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();

        assert_eq!(fitted.std()[0], 1.0);
        let scaled = fitted.transform(&data).unwrap();
        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[1, 0]], 0.0);
    }

    #[test]
    fn test_standard_scaler_without_mean() {
        let data = array![[2.0], [4.0]];
        let fitted = StandardScaler::new().with_mean(false).fit(&data).unwrap();
        let scaled = fitted.transform(&data).unwrap();

        // std is 1.0, no centring
        assert_eq!(scaled, array![[2.0], [4.0]]);
    }

    #[test]
    fn test_standard_scaler_rejects_nan() {
        let data = array![[1.0], [f64::NAN]];
        let result = StandardScaler::new().fit(&data);
        assert!(matches!(result, Err(PreprocessingError::MissingValues(_))));
    }

    #[test]
    fn test_standard_scaler_feature_mismatch() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        assert!(fitted.transform(&array![[1.0]]).is_err());
    }
}
