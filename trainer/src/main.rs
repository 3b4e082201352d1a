#[macro_use]
extern crate log;

use std::path::PathBuf;

use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use trainer::{load_dataset, Experiment, ExperimentConfig, Result};

#[derive(Debug, Parser)]
#[command(about = "Fit linear and logistic models by batch gradient descent")]
struct Cli {
    /// JSON experiment configuration, asked for interactively when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset to use instead of the configured one
    #[arg(long)]
    data: Option<PathBuf>,

    /// Seed for parameter initialization and held-out sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Print every report as a line of JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::from_path(path)?,
        None => select_preset()?,
    };
    if let Some(data) = cli.data {
        config.data.path = data;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let dataset = load_dataset(&config)?;
    let experiment = Experiment::new(&config, &dataset)?;
    for &size in experiment.training_sizes() {
        let report = experiment.run_size(size)?;
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report);
        }
    }

    Ok(())
}

fn select_preset() -> Result<ExperimentConfig> {
    let presets = vec!["Regression", "Binary classification", "Multiclass classification"];

    let e = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select problem type")
        .items(&presets)
        .default(0)
        .interact()?;

    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Path to the dataset")
        .interact_text()?;
    let path = PathBuf::from(path);

    Ok(match e {
        0 => ExperimentConfig::regression_preset(path),
        1 => ExperimentConfig::binary_preset(path),
        _ => ExperimentConfig::multiclass_preset(path),
    })
}
