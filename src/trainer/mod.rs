//! Fits the crop classifier and the water-need regressor.
//!
//! Both pipelines share one seeded holdout split and the same preprocessing
//! shape, but are fit independently. Crop names are integer-encoded up front
//! and the encoder travels with the crop artifact.

use std::path::Path;

use crate::artifact::{Artifact, ArtifactKind, ArtifactPair, CropArtifact, WaterArtifact};
use crate::dataset::{take, train_test_split, AdaptedDataset};
use crate::error::{ArtifactError, ModelError};
use crate::metrics::Metrics;
use crate::model::{ForestClassifier, ForestConfig, ForestRegressor};
use crate::pipeline::Pipeline;
use crate::preprocessing::{ImputeStrategy, LabelEncoder};

/// Holdout figures from one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub features: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    /// Classifier accuracy on the holdout, in `[0, 1]`.
    pub crop_accuracy: f64,
    pub water_rmse: f64,
    pub synthetic_water: bool,
}

/// Artifacts produced by [`Trainer::train`], not yet written anywhere.
#[derive(Debug)]
pub struct TrainedModels {
    pub crop: CropArtifact,
    pub water: WaterArtifact,
    pub report: TrainingReport,
}

impl TrainedModels {
    /// Pair the artifacts, checking they agree on features.
    pub fn into_pair(self) -> Result<ArtifactPair, ArtifactError> {
        ArtifactPair::new(self.crop, self.water)
    }

    /// Write both artifacts into `model_dir`.
    pub fn save<P: AsRef<Path>>(self, model_dir: P) -> Result<TrainingReport, ArtifactError> {
        let report = self.report.clone();
        self.into_pair()?.save(model_dir)?;
        Ok(report)
    }
}

pub struct Trainer {
    forest: ForestConfig,
    imputer: ImputeStrategy,
    test_fraction: f64,
    split_seed: u64,
}

pub struct TrainerBuilder {
    forest: ForestConfig,
    imputer: ImputeStrategy,
    test_fraction: f64,
    split_seed: u64,
}

impl TrainerBuilder {
    pub fn new() -> Self {
        Self {
            forest: ForestConfig::default(),
            imputer: ImputeStrategy::Median,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }

    pub fn forest(mut self, config: ForestConfig) -> Self {
        self.forest = config;
        self
    }

    pub fn imputer(mut self, strategy: ImputeStrategy) -> Self {
        self.imputer = strategy;
        self
    }

    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    pub fn build(self) -> Trainer {
        Trainer {
            forest: self.forest,
            imputer: self.imputer,
            test_fraction: self.test_fraction,
            split_seed: self.split_seed,
        }
    }
}

impl Default for TrainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Trainer {
    fn default() -> Self {
        TrainerBuilder::new().build()
    }
}

impl Trainer {
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::new()
    }

    pub fn train(&self, data: &AdaptedDataset) -> Result<TrainedModels, ModelError> {
        let (encoder, codes) = LabelEncoder::new().fit_transform(&data.crop)?;
        let split = train_test_split(data.n_rows(), self.test_fraction, self.split_seed)?;

        let x_train = split.train_rows(&data.x);
        let x_test = split.test_rows(&data.x);

        log::info!("Training crop classifier on features: {:?}", data.features);
        let crop_pipeline = Pipeline::new(ForestClassifier::new(self.forest.clone()))
            .with_imputer(self.imputer.clone())
            .fit(&x_train, &take(&codes, &split.train))?;
        let crop_preds = crop_pipeline.predict(&x_test)?;
        let crop_truth: Vec<f64> = take(&codes, &split.test)
            .into_iter()
            .map(|c| c as f64)
            .collect();
        let crop_accuracy = Metrics::accuracy(&crop_truth, &crop_preds);
        log::info!("Crop classifier accuracy: {:.3}", crop_accuracy);

        log::info!("Training water-need regressor");
        let water_pipeline = Pipeline::new(ForestRegressor::new(self.forest.clone()))
            .with_imputer(self.imputer.clone())
            .fit(&x_train, &take(&data.water, &split.train))?;
        let water_preds = water_pipeline.predict(&x_test)?;
        let water_rmse = Metrics::rmse(&take(&data.water, &split.test), &water_preds);
        log::info!("Water regressor RMSE: {:.4}", water_rmse);

        let n_train = split.train.len();
        let crop = Artifact::new(ArtifactKind::Crop, crop_pipeline, data.features.clone())
            .with_label_encoder(encoder)
            .with_training_rows(n_train);
        let water = Artifact::new(ArtifactKind::Water, water_pipeline, data.features.clone())
            .with_synthetic(data.is_synthetic())
            .with_training_rows(n_train);

        Ok(TrainedModels {
            crop,
            water,
            report: TrainingReport {
                features: data.features.clone(),
                n_train,
                n_test: split.test.len(),
                crop_accuracy,
                water_rmse,
                synthetic_water: data.is_synthetic(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{adapt, Table};
    use tempfile::tempdir;

    /// Sensor-style table with two crops split cleanly on temperature.
    fn sensor_csv(n: usize) -> String {
        let mut csv = String::from("temperature,humidity,soil,ph,npk,crop_type,water_need\n");
        for i in 0..n {
            let (temp, crop, water) = if i % 2 == 0 {
                (18.0 + (i % 5) as f64, "wheat", 2.0 + (i % 3) as f64 * 0.1)
            } else {
                (32.0 + (i % 5) as f64, "rice", 8.0 + (i % 3) as f64 * 0.1)
            };
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                temp,
                60 + i % 20,
                5 + i % 3,
                6.0 + (i % 4) as f64 * 0.2,
                30 + i % 15,
                crop,
                water
            ));
        }
        csv
    }

    fn quick_trainer() -> Trainer {
        Trainer::builder()
            .forest(ForestConfig::default().with_n_trees(15))
            .build()
    }

    #[test]
    fn test_trainer_default_settings() {
        let trainer = Trainer::default();
        assert_eq!(trainer.forest.n_trees, 200);
        assert_eq!(trainer.forest.seed, 42);
        assert_eq!(trainer.test_fraction, 0.2);
        assert_eq!(trainer.split_seed, 42);
        assert_eq!(trainer.imputer, ImputeStrategy::Median);
    }

    #[test]
    fn test_trainer_fits_both_artifacts() {
        let data = adapt(&Table::from_reader(sensor_csv(40).as_bytes()).unwrap()).unwrap();
        let trained = quick_trainer().train(&data).unwrap();

        let report = &trained.report;
        assert_eq!((report.n_train, report.n_test), (32, 8));
        assert!(report.crop_accuracy > 0.8, "accuracy {}", report.crop_accuracy);
        assert!(report.water_rmse < 1.5, "rmse {}", report.water_rmse);
        assert!(!report.synthetic_water);

        assert_eq!(trained.crop.features(), trained.water.features());
        assert_eq!(trained.crop.metadata().n_train_rows, 32);
        assert_eq!(
            trained.crop.label_encoder().map(|e| e.n_classes()),
            Some(2)
        );
        assert!(trained.water.label_encoder().is_none());
    }

    #[test]
    fn test_trainer_marks_synthetic_water() {
        let mut csv = String::from("N,P,K,temperature,humidity,ph,rainfall,label\n");
        for i in 0..20 {
            csv.push_str(&format!("{},40,40,25,80,6.5,{},crop{}\n", 10 + i, 100 + i * 10, i % 3));
        }
        let data = adapt(&Table::from_reader(csv.as_bytes()).unwrap()).unwrap();
        let trained = quick_trainer().train(&data).unwrap();

        assert!(trained.report.synthetic_water);
        assert!(trained.water.is_synthetic());
    }

    #[test]
    fn test_trained_models_save() {
        let dir = tempdir().unwrap();
        let data = adapt(&Table::from_reader(sensor_csv(20).as_bytes()).unwrap()).unwrap();
        let report = quick_trainer().train(&data).unwrap().save(dir.path()).unwrap();

        assert_eq!(report.features.len(), 5);
        let pair = ArtifactPair::load(dir.path()).unwrap();
        assert_eq!(pair.features(), &report.features[..]);
    }

    #[test]
    fn test_trainer_rejects_single_row() {
        let data = adapt(&Table::from_reader(sensor_csv(1).as_bytes()).unwrap()).unwrap();
        assert!(quick_trainer().train(&data).is_err());
    }
}
