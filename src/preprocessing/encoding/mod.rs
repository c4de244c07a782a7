//! Target encoding.
//!
//! ## LabelEncoder
//! Encodes crop names to integer class codes for the classifier and decodes
//! its output back to names.

mod label;

pub use label::{FittedLabelEncoder, LabelEncoder};
