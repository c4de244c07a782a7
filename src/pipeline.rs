//! Predictive pipeline: imputation, scaling, then an estimator.
//!
//! Both the crop classifier and the water-need regressor use this shape:
//!
//! ```text
//! raw features (NaN = missing) → SimpleImputer(median) → StandardScaler → estimator
//! ```
//!
//! The fitted form is a single serializable value, so an artifact only needs to
//! carry one pipeline per task.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Estimator, FittedEstimator, ModelError};
use crate::preprocessing::{
    FittedSimpleImputer, FittedStandardScaler, FittedTransformer, ImputeStrategy,
    PreprocessingError, SimpleImputer, StandardScaler, Transformer,
};

/// Unfitted pipeline.
#[derive(Clone, Debug)]
pub struct Pipeline<E: Estimator> {
    imputer: SimpleImputer,
    scaler: StandardScaler,
    estimator: E,
}

impl<E: Estimator> Pipeline<E> {
    /// Median imputation, standard scaling, then `estimator`.
    pub fn new(estimator: E) -> Self {
        Self {
            imputer: SimpleImputer::new(ImputeStrategy::Median),
            scaler: StandardScaler::new(),
            estimator,
        }
    }

    pub fn with_imputer(mut self, strategy: ImputeStrategy) -> Self {
        self.imputer = SimpleImputer::new(strategy);
        self
    }

    /// Fit every stage in order, each on the previous stage's output.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &[E::Target],
    ) -> Result<FittedPipeline<E::Fitted>, ModelError> {
        let imputer = self.imputer.fit(x)?;
        let imputed = imputer.transform(x)?;
        let scaler = self.scaler.fit(&imputed)?;
        let scaled = scaler.transform(&imputed)?;
        let model = self.estimator.fit(&scaled, y)?;

        Ok(FittedPipeline {
            imputer,
            scaler,
            model,
        })
    }
}

/// Fitted pipeline ready for inference.
#[derive(Serialize, Deserialize)]
pub struct FittedPipeline<M> {
    imputer: FittedSimpleImputer,
    scaler: FittedStandardScaler,
    model: M,
}

impl<M: FittedEstimator> FittedPipeline<M> {
    /// Number of raw input features expected.
    pub fn n_features_in(&self) -> usize {
        self.imputer.n_features_in()
    }

    pub fn imputer(&self) -> &FittedSimpleImputer {
        &self.imputer
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Impute and scale raw features.
    pub fn preprocess(&self, x: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        let imputed = self.imputer.transform(x)?;
        self.scaler.transform(&imputed)
    }

    /// Make predictions on raw (possibly incomplete) features.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        let processed = self.preprocess(x)?;
        self.model.predict(&processed)
    }
}

impl<M> fmt::Debug for FittedPipeline<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedPipeline")
            .field("imputer", &self.imputer)
            .field("scaler", &self.scaler)
            .field("model", &std::any::type_name::<M>())
            .finish()
    }
}
