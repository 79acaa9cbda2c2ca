//! pneumoscan CLI - screen a chest X-ray image for pneumonia.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pneumoscan::{image, report, Classifier, Config, ModelStore};

/// Screen a chest X-ray image for pneumonia using two on-device models.
#[derive(Parser, Debug)]
#[command(name = "pneumoscan")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path.
    #[arg(value_name = "IMAGE")]
    input: PathBuf,

    /// Directory holding the two model artifacts. Defaults to the platform
    /// data directory.
    #[arg(short, long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Write a PDF screening report to this path.
    #[arg(short, long, value_name = "PDF")]
    report: Option<PathBuf>,

    /// Gating threshold (0.0-1.0). Scores at or below are rejected as
    /// non-X-ray.
    #[arg(long, default_value = "0.5", value_name = "FLOAT")]
    gate_threshold: f32,

    /// Pneumonia threshold (0.0-1.0). Scores above report pneumonia.
    #[arg(long, default_value = "0.5", value_name = "FLOAT")]
    pneumonia_threshold: f32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pneumoscan={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    // Validate input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let store = args
        .model_dir
        .as_ref()
        .map_or_else(ModelStore::new, ModelStore::with_dir);

    let config = Config {
        gate_threshold: args.gate_threshold,
        pneumonia_threshold: args.pneumonia_threshold,
    };

    let mut classifier =
        Classifier::from_store(&store, config).context("Failed to load models")?;

    let img = image::load_image(&args.input).context("Failed to load image")?;

    let result = classifier
        .classify(&img)
        .context("Failed to classify image")?;

    match result.confidence {
        Some(confidence) => {
            println!("Prediction: {}", result.label);
            println!("Confidence: {:.2}%", confidence * 100.0);
        }
        None => println!("{}", result.label),
    }

    if let Some(report_path) = &args.report {
        if result.applicable {
            report::save_report(report_path, &img, &result)
                .context("Failed to generate report")?;
            println!("Report saved: {}", report_path.display());
        } else {
            tracing::warn!("No prediction available, skipping report");
        }
    }

    Ok(())
}
