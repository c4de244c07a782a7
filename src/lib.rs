//! # cropcast
//!
//! Crop recommendation and water-need estimation from soil and weather
//! readings.
//!
//! Training ([`trainer`]) fits two pipelines, a random-forest classifier for
//! the crop and a random-forest regressor for the water need, from a CSV
//! dataset in one of two known column conventions ([`dataset`]). Each is
//! saved as an [`artifact::Artifact`] that remembers the feature names it was
//! trained on.
//!
//! Inference ([`predictor`]) takes one loosely-shaped JSON record, maps it onto
//! those feature names ([`reconcile`]), runs both pipelines, and returns a
//! tagged [`predictor::PredictionOutcome`].
//!
//! ```no_run
//! use cropcast::input::InputSource;
//! use cropcast::predictor::Predictor;
//!
//! let outcome = Predictor::new("artifacts").run(
//!     &InputSource::Literal(r#"{"temperature": 25, "humidity": 80, "npk": 40}"#.into()),
//!     std::io::empty(),
//! );
//! println!("{}", outcome.to_json().unwrap());
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod input;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod preprocessing;
pub mod reconcile;
pub mod serialization;
pub mod trainer;

pub use artifact::{Artifact, ArtifactKind, ArtifactPair, CropArtifact, WaterArtifact};
pub use config::Settings;
pub use dataset::{adapt, AdaptedDataset, SchemaKind, Table};
pub use error::{FailureKind, PredictError};
pub use predictor::{Prediction, PredictionOutcome, Predictor};
pub use reconcile::{reconcile, FeatureRow, FeatureValue, InputRecord};
pub use trainer::{Trainer, TrainingReport};
