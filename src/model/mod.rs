//! Estimators: the supervised models at the end of a pipeline.
//!
//! The crate only depends on the `fit` / `predict` contract below. The concrete
//! ensembles live in [`forest`] and delegate to `smartcore`.

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::preprocessing::PreprocessingError;

pub mod forest;
pub use forest::{
    FittedForestClassifier, FittedForestRegressor, ForestClassifier, ForestConfig,
    ForestRegressor,
};

/// Failures raised while fitting a model or running a prediction.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model fit failed: {0}")]
    Fit(String),
    #[error("model prediction failed: {0}")]
    Predict(String),
    /// A feature value that never became a number reached the pipeline.
    #[error("could not convert string to float: '{value}' (feature '{feature}')")]
    NonNumeric { feature: String, value: String },
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}

/// Unfitted estimator with hyperparameters.
pub trait Estimator: Clone {
    /// Target type the estimator learns from.
    type Target;
    /// The inference-only form produced by [`Estimator::fit`].
    type Fitted: FittedEstimator;

    fn fit(&self, x: &Array2<f64>, y: &[Self::Target]) -> Result<Self::Fitted, ModelError>;
}

/// Trained estimator. Predictions come back as `f64`: class codes for
/// classifiers, raw estimates for regressors.
pub trait FittedEstimator: Serialize + DeserializeOwned {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError>;

    /// Number of feature columns seen during fit.
    fn n_features_in(&self) -> usize;
}

/// Shared input validation for `fit` implementations.
pub(crate) fn check_training_shape(x: &Array2<f64>, n_targets: usize) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::Fit("cannot train on an empty dataset".to_string()));
    }
    if x.nrows() != n_targets {
        return Err(ModelError::Fit(format!(
            "feature and target count mismatch: {} rows, {} targets",
            x.nrows(),
            n_targets
        )));
    }
    Ok(())
}
