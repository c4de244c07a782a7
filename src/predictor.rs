//! Inference: one record in, one crop and water-need estimate out.
//!
//! [`Predictor::run`] is the single error boundary of the predict path. Every
//! failure below it comes back as a typed [`PredictError`] and is turned into
//! [`PredictionOutcome::Failed`] there, carrying both the message and its
//! [`FailureKind`].

use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactPair;
use crate::config::Settings;
use crate::error::{DecodeError, FailureKind, ModelError, PredictError};
use crate::input::InputSource;
use crate::preprocessing::FittedLabelEncoder;
use crate::reconcile::{reconcile, InputRecord};

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_crop: String,
    /// Rounded to two decimals.
    pub predicted_water_need: f64,
}

/// Exactly one of these is produced per invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictionOutcome {
    Success(Prediction),
    Failed { error: String, kind: FailureKind },
}

impl PredictionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Result<Prediction, PredictError>> for PredictionOutcome {
    fn from(result: Result<Prediction, PredictError>) -> Self {
        match result {
            Ok(prediction) => PredictionOutcome::Success(prediction),
            Err(e) => PredictionOutcome::Failed {
                error: e.to_string(),
                kind: e.kind(),
            },
        }
    }
}

/// Loads artifacts from a model directory on every call.
#[derive(Debug, Clone)]
pub struct Predictor {
    model_dir: PathBuf,
}

impl Predictor {
    pub fn new<P: AsRef<Path>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.model_dir)
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn predict(&self, record: &InputRecord) -> Result<Prediction, PredictError> {
        let pair = ArtifactPair::load(&self.model_dir)?;
        predict_with(&pair, record)
    }

    /// Read the record from `source` and predict, never failing.
    pub fn run<R: Read>(&self, source: &InputSource, stdin: R) -> PredictionOutcome {
        let result = source
            .read_record(stdin)
            .map_err(PredictError::from)
            .and_then(|record| self.predict(&record));
        if let Err(e) = &result {
            log::debug!("prediction failed ({:?}): {}", e.kind(), e);
        }
        result.into()
    }
}

/// Predict with already loaded artifacts.
pub fn predict_with(pair: &ArtifactPair, record: &InputRecord) -> Result<Prediction, PredictError> {
    let row = reconcile(pair.features(), record);
    if row.n_missing() > 0 {
        log::debug!(
            "{} of {} features missing, left to imputation",
            row.n_missing(),
            row.len()
        );
    }
    let x = row.to_matrix()?;

    let raw_label = pair
        .crop()
        .pipeline()
        .predict(&x)?
        .first()
        .copied()
        .ok_or_else(|| ModelError::Predict("classifier returned no output".to_string()))?;
    let predicted_crop = decode_label(pair.crop().label_encoder(), raw_label)?;

    let water = pair
        .water()
        .pipeline()
        .predict(&x)?
        .first()
        .copied()
        .ok_or_else(|| ModelError::Predict("regressor returned no output".to_string()))?;

    Ok(Prediction {
        predicted_crop,
        predicted_water_need: round2(water),
    })
}

/// Map a classifier output back to a crop name.
///
/// The output is first read as a class index; if that fails, its textual form
/// is looked up as a class name. Without an encoder the raw value is returned.
pub fn decode_label(encoder: Option<&FittedLabelEncoder>, raw: f64) -> Result<String, DecodeError> {
    let Some(encoder) = encoder else {
        return Ok(raw.to_string());
    };

    let by_index = (raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0)
        .then(|| encoder.class_of(raw as usize))
        .flatten();
    if let Some(class) = by_index {
        return Ok(class.to_string());
    }

    let text = raw.to_string();
    if encoder.index_of(&text).is_some() {
        return Ok(text);
    }

    Err(DecodeError {
        raw,
        n_classes: encoder.n_classes(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
