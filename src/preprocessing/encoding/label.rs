//! Label encoding for 1D target labels.
//!
//! Maps crop names to integer indices `0..n_classes` by their sorted order, so
//! the vocabulary is fixed by the training data and decoding is exact.

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label encoder for string targets.
///
/// # Example
/// ```
/// use cropcast::preprocessing::LabelEncoder;
///
/// let labels = ["rice", "maize", "rice", "chickpea"];
/// let (fitted, encoded) = LabelEncoder::new().fit_transform(&labels).unwrap();
///
/// assert_eq!(fitted.classes(), ["chickpea", "maize", "rice"]);
/// assert_eq!(encoded, vec![2, 1, 2, 0]);
/// assert_eq!(fitted.inverse_transform(&encoded).unwrap(), labels);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    /// Create a new LabelEncoder.
    pub fn new() -> Self {
        Self
    }

    /// Fit the encoder to the labels and return the fitted encoder.
    pub fn fit<S: AsRef<str>>(&self, labels: &[S]) -> Result<FittedLabelEncoder, PreprocessingError> {
        if labels.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit LabelEncoder on empty data".to_string(),
            ));
        }

        let classes: BTreeSet<&str> = labels.iter().map(|label| label.as_ref()).collect();
        Ok(FittedLabelEncoder {
            classes: classes.into_iter().map(str::to_string).collect(),
        })
    }

    /// Fit and transform in one step.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> Result<(FittedLabelEncoder, Vec<usize>), PreprocessingError> {
        let fitted = self.fit(labels)?;
        let encoded = fitted.transform(labels)?;
        Ok((fitted, encoded))
    }
}

/// Fitted LabelEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLabelEncoder {
    /// Unique classes in sorted order; the position is the code.
    classes: Vec<String>,
}

impl FittedLabelEncoder {
    /// Get the unique classes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Get the number of classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code of a single label, if it was seen during fit.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    /// Label of a single code, if it is inside the vocabulary.
    pub fn class_of(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Transform labels to encoded indices.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, PreprocessingError> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.index_of(label)
                    .ok_or_else(|| PreprocessingError::UnknownLabel(label.to_string()))
            })
            .collect()
    }

    /// Inverse transform encoded indices back to original labels.
    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<String>, PreprocessingError> {
        indices
            .iter()
            .map(|&idx| {
                self.class_of(idx).map(str::to_string).ok_or_else(|| {
                    PreprocessingError::InvalidParameter(format!(
                        "Index {} out of bounds ({} classes)",
                        idx,
                        self.n_classes()
                    ))
                })
            })
            .collect()
    }
}
