//! Data preprocessing transformers.
//!
//! Transformers follow a fitted/unfitted split: a [`Transformer`] holds
//! hyperparameters and learns from data, its [`FittedTransformer`] holds the
//! learned statistics and is what gets persisted inside an artifact.
//!
//! # Available Transformers
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`SimpleImputer`] | Fill NaN with mean, median, most_frequent, or constant |
//! | [`StandardScaler`] | Z-score normalization |
//! | [`LabelEncoder`] | Crop names ↔ integer class codes |

pub mod encoding;
pub mod error;
pub mod imputation;
pub mod scaling;
pub mod traits;

pub use encoding::{FittedLabelEncoder, LabelEncoder};
pub use error::PreprocessingError;
pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerConfig};
pub use traits::{FittedTransformer, Transformer};
