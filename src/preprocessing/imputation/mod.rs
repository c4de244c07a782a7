//! Imputation transformers for handling missing values.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`SimpleImputer`] | Impute with mean, median, most_frequent, or constant |

pub mod simple;

pub use simple::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
