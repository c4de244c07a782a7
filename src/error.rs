//! Error taxonomy for training and inference.
//!
//! Training-side errors ([`SchemaError`], [`ModelError`]) abort a training
//! run. Inference-side errors all funnel into [`PredictError`], whose
//! [`FailureKind`] is reported alongside the message so callers never have to
//! match on strings.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::artifact::ArtifactKind;
pub use crate::model::ModelError;
pub use crate::preprocessing::PreprocessingError;

/// Dataset discovery and schema inference failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No suitable dataset found in {dir}. Put {} there.", .candidates.join(" or "))]
    DatasetNotFound {
        dir: PathBuf,
        candidates: Vec<String>,
    },
    #[error("failed to read dataset {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset has no rows")]
    Empty,
    #[error("No known feature columns found in dataset")]
    NoFeatureColumns,
    #[error("No crop label column found (expected 'label' or 'crop_type')")]
    MissingCropLabel,
    #[error("No column available to derive water need (need 'water_need', 'rainfall' or 'humidity')")]
    NoWaterSource,
    #[error("No 'water_need' column found; evaluation needs observed water-need values")]
    MissingWaterNeed,
    #[error("column '{column}' row {row}: cannot parse '{value}' as a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error("column '{column}' row {row}: target value is missing")]
    MissingTarget { column: String, row: usize },
}

/// Loading, validating, or writing an artifact failed.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {path} not found; run `cropcast train` first")]
    Missing { path: PathBuf },
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode artifact {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to encode {kind} artifact: {reason}")]
    Encode { kind: ArtifactKind, reason: String },
    #[error("artifact {path} has format version {found}, expected {expected}")]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("artifact {path} holds a {found} model, expected a {expected} model")]
    WrongKind {
        path: PathBuf,
        found: ArtifactKind,
        expected: ArtifactKind,
    },
    #[error("crop and water artifacts were trained on different features: crop {crop:?}, water {water:?}")]
    FeatureMismatch {
        crop: Vec<String>,
        water: Vec<String>,
    },
}

/// The input record could not be obtained.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No input provided (stdin empty)")]
    Empty,
    #[error("failed to read input file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A classifier output that maps to no known crop.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("predicted label {raw} is outside the trained vocabulary of {n_classes} crops")]
pub struct DecodeError {
    pub raw: f64,
    pub n_classes: usize,
}

/// Everything that can stop a prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Machine-readable class of a failed prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Input,
    Artifact,
    Model,
    Decode,
}

impl PredictError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PredictError::Input(_) => FailureKind::Input,
            PredictError::Artifact(_) => FailureKind::Artifact,
            PredictError::Model(_) => FailureKind::Model,
            PredictError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Failures of the offline evaluation run.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_not_found_lists_candidates() {
        let err = SchemaError::DatasetNotFound {
            dir: PathBuf::from("data"),
            candidates: vec!["a.csv".to_string(), "b.csv".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No suitable dataset found in data. Put a.csv or b.csv there."
        );
    }

    #[test]
    fn test_predict_error_kind() {
        assert_eq!(PredictError::from(InputError::Empty).kind(), FailureKind::Input);
        let decode = DecodeError {
            raw: 7.0,
            n_classes: 3,
        };
        assert_eq!(PredictError::from(decode).kind(), FailureKind::Decode);
        let model = ModelError::Predict("boom".to_string());
        assert_eq!(PredictError::from(model).kind(), FailureKind::Model);
    }

    #[test]
    fn test_transparent_messages_pass_through() {
        let err = PredictError::from(InputError::Empty);
        assert_eq!(err.to_string(), "No input provided (stdin empty)");
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::Artifact).unwrap();
        assert_eq!(json, "\"artifact\"");
    }
}
