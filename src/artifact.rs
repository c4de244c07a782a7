//! Trained model artifacts.
//!
//! An [`Artifact`] bundles a fitted pipeline, an optional label encoder and the
//! ordered feature names the pipeline was trained on. It is written once by the
//! trainer and read-only afterwards.
//!
//! The on-disk layout is a bincode stream that starts with a small
//! [`ArtifactHeader`] (format version + kind), so a stale or swapped file is
//! rejected before the full payload is decoded.
//!
//! [`ArtifactPair`] is the only way the predictor gets at artifacts: it checks
//! at load time that both were trained on the same feature list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{CROP_ARTIFACT_FILE, WATER_ARTIFACT_FILE};
use crate::error::ArtifactError;
use crate::model::{FittedEstimator, FittedForestClassifier, FittedForestRegressor};
use crate::pipeline::FittedPipeline;
use crate::preprocessing::FittedLabelEncoder;
use crate::serialization::SerializableParams;

/// Bumped whenever the serialized layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Which task an artifact serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Crop,
    Water,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Crop => write!(f, "crop"),
            ArtifactKind::Water => write!(f, "water"),
        }
    }
}

/// Leading fields of every artifact file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub kind: ArtifactKind,
}

/// Provenance recorded at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of the crate that wrote the artifact.
    pub crate_version: String,
    /// Rows the pipeline was fitted on.
    pub n_train_rows: usize,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            n_train_rows: 0,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Artifact<M> {
    header: ArtifactHeader,
    pipeline: FittedPipeline<M>,
    label_encoder: Option<FittedLabelEncoder>,
    features: Vec<String>,
    /// Only meaningful for water artifacts: targets were derived, not observed.
    synthetic: bool,
    metadata: ArtifactMetadata,
}

pub type CropArtifact = Artifact<FittedForestClassifier>;
pub type WaterArtifact = Artifact<FittedForestRegressor>;

impl<M: FittedEstimator> Artifact<M> {
    pub fn new(kind: ArtifactKind, pipeline: FittedPipeline<M>, features: Vec<String>) -> Self {
        Self {
            header: ArtifactHeader {
                format_version: FORMAT_VERSION,
                kind,
            },
            pipeline,
            label_encoder: None,
            features,
            synthetic: false,
            metadata: ArtifactMetadata::default(),
        }
    }

    pub fn with_label_encoder(mut self, encoder: FittedLabelEncoder) -> Self {
        self.label_encoder = Some(encoder);
        self
    }

    pub fn with_synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    pub fn with_training_rows(mut self, n_train_rows: usize) -> Self {
        self.metadata.n_train_rows = n_train_rows;
        self
    }

    pub fn kind(&self) -> ArtifactKind {
        self.header.kind
    }

    pub fn pipeline(&self) -> &FittedPipeline<M> {
        &self.pipeline
    }

    pub fn label_encoder(&self) -> Option<&FittedLabelEncoder> {
        self.label_encoder.as_ref()
    }

    /// Ordered feature names the pipeline expects.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Write the artifact, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes().map_err(|e| ArtifactError::Encode {
            kind: self.kind(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, bytes).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("saved {} artifact to {}", self.kind(), path.display());
        Ok(())
    }

    /// Read an artifact and check that it is a current-format `expected` one.
    pub fn load<P: AsRef<Path>>(path: P, expected: ArtifactKind) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ArtifactError::Missing {
                path: path.to_path_buf(),
            },
            _ => ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let decode_error = |e: bincode::Error| ArtifactError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let header = ArtifactHeader::from_bytes(&bytes).map_err(decode_error)?;
        if header.format_version != FORMAT_VERSION {
            return Err(ArtifactError::Version {
                path: path.to_path_buf(),
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if header.kind != expected {
            return Err(ArtifactError::WrongKind {
                path: path.to_path_buf(),
                found: header.kind,
                expected,
            });
        }

        let artifact = Self::from_bytes(&bytes).map_err(decode_error)?;
        log::debug!(
            "loaded {} artifact from {} ({} features)",
            artifact.kind(),
            path.display(),
            artifact.features.len()
        );
        Ok(artifact)
    }
}

impl<M> fmt::Debug for Artifact<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("header", &self.header)
            .field("features", &self.features)
            .field("label_encoder", &self.label_encoder)
            .field("synthetic", &self.synthetic)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Crop and water artifacts known to share one feature list.
#[derive(Debug)]
pub struct ArtifactPair {
    crop: CropArtifact,
    water: WaterArtifact,
}

impl ArtifactPair {
    /// Pair two artifacts, failing fast if their feature lists differ.
    pub fn new(crop: CropArtifact, water: WaterArtifact) -> Result<Self, ArtifactError> {
        if crop.features() != water.features() {
            return Err(ArtifactError::FeatureMismatch {
                crop: crop.features().to_vec(),
                water: water.features().to_vec(),
            });
        }
        Ok(Self { crop, water })
    }

    /// Load both artifacts from their fixed file names inside `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, ArtifactError> {
        let (crop_path, water_path) = Self::paths(model_dir.as_ref());
        let crop = CropArtifact::load(&crop_path, ArtifactKind::Crop)?;
        let water = WaterArtifact::load(&water_path, ArtifactKind::Water)?;
        Self::new(crop, water)
    }

    /// Write both artifacts into `model_dir`.
    pub fn save<P: AsRef<Path>>(&self, model_dir: P) -> Result<(), ArtifactError> {
        let (crop_path, water_path) = Self::paths(model_dir.as_ref());
        self.crop.save(crop_path)?;
        self.water.save(water_path)
    }

    fn paths(model_dir: &Path) -> (PathBuf, PathBuf) {
        (
            model_dir.join(CROP_ARTIFACT_FILE),
            model_dir.join(WATER_ARTIFACT_FILE),
        )
    }

    /// The shared, canonical feature list.
    pub fn features(&self) -> &[String] {
        self.crop.features()
    }

    pub fn crop(&self) -> &CropArtifact {
        &self.crop
    }

    pub fn water(&self) -> &WaterArtifact {
        &self.water
    }
}
