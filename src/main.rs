use clap::Parser;
use std::error::Error;
use std::process::ExitCode;

use cropcast::cli::{self, Cli, Commands};
use cropcast::{PredictionOutcome, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.command.default_log_filter()),
    )
    .init();

    let settings = Settings::load().with_overrides(cli.model_dir, cli.data_dir);

    match cli.command {
        Commands::Predict { input } => report_prediction(cli::run_predict(&settings, input)),
        Commands::Train { data } => exit_with(cli::run_train(&settings, data)),
        Commands::Evaluate { data } => exit_with(cli::run_evaluate(&settings, data)),
    }
}

fn report_prediction(outcome: PredictionOutcome) -> ExitCode {
    if let PredictionOutcome::Failed { error, .. } = &outcome {
        eprintln!("{}", error);
    }
    match outcome.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to encode result: {}", e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::from(outcome.exit_code())
}

fn exit_with<T>(result: Result<T, Box<dyn Error>>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
