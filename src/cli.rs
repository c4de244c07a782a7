use clap::{Parser, Subcommand};
use std::error::Error;
use std::io;
use std::path::PathBuf;

use crate::artifact::ArtifactPair;
use crate::config::{Settings, EVALUATION_DATASET};
use crate::dataset::{adapt, find_dataset, Table};
use crate::evaluate::{evaluate, EvaluationReport};
use crate::input::InputSource;
use crate::predictor::{PredictionOutcome, Predictor};
use crate::trainer::{Trainer, TrainingReport};

#[derive(Parser, Debug)]
#[command(name = "cropcast", version, about = "Crop recommendation and water-need prediction")]
pub struct Cli {
    #[arg(long, global = true, help = "Directory holding crop_model.bin and water_model.bin")]
    pub model_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory searched for training and evaluation CSVs")]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit both models and write their artifacts.
    Train {
        #[arg(long, help = "CSV dataset; discovered in the data directory when omitted")]
        data: Option<PathBuf>,
    },
    /// Predict crop and water need for one JSON record.
    Predict {
        /// JSON file path or literal JSON; stdin when omitted.
        input: Option<String>,
    },
    /// Score saved artifacts on a labelled CSV.
    Evaluate {
        #[arg(long, help = "Labelled CSV; sensor_data.csv in the data directory when omitted")]
        data: Option<PathBuf>,
    },
}

impl Commands {
    /// Predict keeps stderr quiet so stdout stays a single JSON object.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Commands::Predict { .. } => "warn",
            _ => "info",
        }
    }
}

pub fn run_train(settings: &Settings, data: Option<PathBuf>) -> Result<TrainingReport, Box<dyn Error>> {
    let path = match data {
        Some(path) => path,
        None => find_dataset(&settings.data_dir)?,
    };
    log::info!("Loading dataset: {}", path.display());

    let table = Table::from_path(&path)?;
    let dataset = adapt(&table)?;
    let report = Trainer::default()
        .train(&dataset)?
        .save(&settings.model_dir)?;

    log::info!(
        "Saved crop and water artifacts in {} ({} training rows, {} holdout rows)",
        settings.model_dir.display(),
        report.n_train,
        report.n_test
    );
    Ok(report)
}

pub fn run_evaluate(
    settings: &Settings,
    data: Option<PathBuf>,
) -> Result<EvaluationReport, Box<dyn Error>> {
    let pair = ArtifactPair::load(&settings.model_dir)?;
    let path = data.unwrap_or_else(|| settings.data_path(EVALUATION_DATASET));
    log::info!("Evaluating on {}", path.display());

    let table = Table::from_path(&path)?;
    let report = evaluate(&pair, &table)?;

    println!("Crop type accuracy: {:.2}%", report.crop_accuracy * 100.0);
    println!("Water need mean absolute error: {:.2}", report.water_mae);
    Ok(report)
}

pub fn run_predict(settings: &Settings, input: Option<String>) -> PredictionOutcome {
    let source = InputSource::from_arg(input.as_deref());
    Predictor::from_settings(settings).run(&source, io::stdin().lock())
}
