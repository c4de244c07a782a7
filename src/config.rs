//! Runtime settings.
//!
//! Resolution order, lowest to highest priority: built-in defaults, a `.env`
//! file in the working directory, process environment, explicit overrides
//! (the CLI flags).

use std::env;
use std::path::{Path, PathBuf};

/// File name of the crop classification artifact inside the model directory.
pub const CROP_ARTIFACT_FILE: &str = "crop_model.bin";
/// File name of the water-need regression artifact inside the model directory.
pub const WATER_ARTIFACT_FILE: &str = "water_model.bin";

/// Training datasets looked up in the data directory, in preference order.
pub const DATASET_CANDIDATES: [&str; 2] = ["Crop_recommendation.csv", "sensor_data.csv"];
/// Labelled dataset used by `evaluate` when none is given.
pub const EVALUATION_DATASET: &str = "sensor_data.csv";

pub const DEFAULT_MODEL_DIR: &str = "artifacts";
pub const DEFAULT_DATA_DIR: &str = "data";

pub const MODEL_DIR_ENV: &str = "CROPCAST_MODEL_DIR";
pub const DATA_DIR_ENV: &str = "CROPCAST_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where artifacts are written by `train` and read by `predict`/`evaluate`.
    pub model_dir: PathBuf,
    /// Where training and evaluation datasets are discovered.
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read the process environment.
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            model_dir: read(MODEL_DIR_ENV, DEFAULT_MODEL_DIR),
            data_dir: read(DATA_DIR_ENV, DEFAULT_DATA_DIR),
        }
    }

    /// Apply explicit overrides on top of the loaded values.
    pub fn with_overrides(mut self, model_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = model_dir {
            self.model_dir = dir;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn crop_artifact_path(&self) -> PathBuf {
        self.model_dir.join(CROP_ARTIFACT_FILE)
    }

    pub fn water_artifact_path(&self) -> PathBuf {
        self.model_dir.join(WATER_ARTIFACT_FILE)
    }

    /// Path of a named dataset inside the data directory.
    pub fn data_path<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.data_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_settings_defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.crop_artifact_path(),
            PathBuf::from("artifacts").join("crop_model.bin")
        );
    }

    #[test]
    fn test_settings_reads_environment_keys() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(MODEL_DIR_ENV, "/srv/models"), (DATA_DIR_ENV, "  ")]);
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.model_dir, PathBuf::from("/srv/models"));
        // blank value falls back to the default
        assert_eq!(settings.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_settings_overrides_win() {
        let settings = Settings::from_lookup(|_| Some("/from/env".to_string()))
            .with_overrides(Some(PathBuf::from("/from/cli")), None);

        assert_eq!(settings.model_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.data_dir, PathBuf::from("/from/env"));
        assert_eq!(
            settings.water_artifact_path(),
            PathBuf::from("/from/cli/water_model.bin")
        );
    }
}
