//! Random forest ensembles backed by `smartcore`.
//!
//! The wrappers convert `ndarray` matrices to smartcore's `DenseMatrix`, carry
//! the forest hyperparameters alongside the fitted model, and keep everything
//! serde-serializable so a forest can live inside an artifact.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::{check_training_shape, Estimator, FittedEstimator, ModelError};

type ClassifierModel = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;
type RegressorModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Hyperparameters shared by both forests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: u16,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn with_n_trees(mut self, n_trees: u16) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u16>) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn classifier_parameters(&self) -> RandomForestClassifierParameters {
        RandomForestClassifierParameters {
            n_trees: self.n_trees.into(),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            seed: self.seed,
            ..Default::default()
        }
    }

    fn regressor_parameters(&self) -> RandomForestRegressorParameters {
        RandomForestRegressorParameters {
            n_trees: self.n_trees.into(),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Row-major copy of an `ndarray` matrix in smartcore's layout.
fn to_dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    let (rows, cols) = x.dim();
    DenseMatrix::new(rows, cols, x.iter().copied().collect(), false)
}

fn check_predict_shape(x: &Array2<f64>, n_features: usize) -> Result<(), ModelError> {
    if x.ncols() != n_features {
        return Err(ModelError::Predict(format!(
            "expected {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::Predict(
            "input contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Random forest classifier over integer class codes.
#[derive(Clone, Debug, Default)]
pub struct ForestClassifier {
    config: ForestConfig,
}

impl ForestClassifier {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

impl Estimator for ForestClassifier {
    type Target = usize;
    type Fitted = FittedForestClassifier;

    fn fit(&self, x: &Array2<f64>, y: &[usize]) -> Result<Self::Fitted, ModelError> {
        check_training_shape(x, y.len())?;

        let codes = y
            .iter()
            .map(|&code| {
                i32::try_from(code)
                    .map_err(|_| ModelError::Fit(format!("class code {} does not fit in i32", code)))
            })
            .collect::<Result<Vec<i32>, _>>()?;

        let model = RandomForestClassifier::fit(
            &to_dense(x),
            &codes,
            self.config.classifier_parameters(),
        )
        .map_err(|e| ModelError::Fit(e.to_string()))?;

        Ok(FittedForestClassifier {
            config: self.config.clone(),
            model,
            n_features: x.ncols(),
        })
    }
}

/// Trained random forest classifier.
#[derive(Serialize, Deserialize)]
pub struct FittedForestClassifier {
    config: ForestConfig,
    model: ClassifierModel,
    n_features: usize,
}

impl FittedForestClassifier {
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl FittedEstimator for FittedForestClassifier {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        check_predict_shape(x, self.n_features)?;
        let codes = self
            .model
            .predict(&to_dense(x))
            .map_err(|e| ModelError::Predict(e.to_string()))?;
        Ok(codes.into_iter().map(f64::from).collect())
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}

/// Random forest regressor.
#[derive(Clone, Debug, Default)]
pub struct ForestRegressor {
    config: ForestConfig,
}

impl ForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

impl Estimator for ForestRegressor {
    type Target = f64;
    type Fitted = FittedForestRegressor;

    fn fit(&self, x: &Array2<f64>, y: &[f64]) -> Result<Self::Fitted, ModelError> {
        check_training_shape(x, y.len())?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Fit(
                "regression targets must be finite".to_string(),
            ));
        }

        let model = RandomForestRegressor::fit(
            &to_dense(x),
            &y.to_vec(),
            self.config.regressor_parameters(),
        )
        .map_err(|e| ModelError::Fit(e.to_string()))?;

        Ok(FittedForestRegressor {
            config: self.config.clone(),
            model,
            n_features: x.ncols(),
        })
    }
}

/// Trained random forest regressor.
#[derive(Serialize, Deserialize)]
pub struct FittedForestRegressor {
    config: ForestConfig,
    model: RegressorModel,
    n_features: usize,
}

impl FittedForestRegressor {
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl FittedEstimator for FittedForestRegressor {
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        check_predict_shape(x, self.n_features)?;
        self.model
            .predict(&to_dense(x))
            .map_err(|e| ModelError::Predict(e.to_string()))
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}
