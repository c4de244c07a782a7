//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: the unfitted, configurable form that learns from data.
//! - [`FittedTransformer`]: the learned form, ready for inference and persistence.
//!
//! All transformers work on row-major `ndarray` matrices of `f64`, with `NaN`
//! standing for a missing value.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Trait for unfitted transformers with hyperparameters.
pub trait Transformer: Clone {
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the data is empty or otherwise
    /// unsuitable for this transformer.
    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, PreprocessingError>;

    /// Fit the transformer and transform the data in one step.
    fn fit_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// Fitted transformers are plain serde data; saving and loading goes through
/// [`SerializableParams`].
pub trait FittedTransformer: Clone + Serialize + DeserializeOwned {
    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::FeatureMismatch`] if the column count
    /// differs from the one seen during fit.
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError>;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Reject matrices whose width differs from the fitted width.
    fn check_features(&self, data: &Array2<f64>) -> Result<(), PreprocessingError> {
        if data.ncols() != self.n_features_in() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features_in(),
                got_features: data.ncols(),
            });
        }
        Ok(())
    }

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes)?)
    }
}
