//! Feature scaling.

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerConfig};
