//! Predict a listing price with one persisted model, or with every model of
//! a model directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use immo_ml_trainer::{format_price, logging, predict_all_models, sample_listing, PricePredictor, Record};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "immo-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict a real-estate price from a persisted model", long_about = None)]
struct Args {
    /// Model file ({dataset}_{key}.json)
    #[arg(short, long, required_unless_present = "model_dir", conflicts_with = "model_dir")]
    model: Option<PathBuf>,

    /// Preprocessor file paired with --model
    #[arg(short, long, requires = "model")]
    preprocessor: Option<PathBuf>,

    /// Predict with every model found under this directory
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// JSON object of feature values; a sample listing is used when absent
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let record: Record = match &args.input {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input {}", path.display()))?;
            serde_json::from_str(&json).context("Input must be a JSON object of feature values")?
        }
        None => sample_listing(),
    };

    if let Some(model_dir) = &args.model_dir {
        let results = predict_all_models(model_dir, &record)?;
        let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!("{} of {} models produced a prediction", ok, results.len());
        return Ok(());
    }

    let model = args.model.context("--model or --model-dir is required")?;
    let predictor = PricePredictor::new(&model, args.preprocessor.as_deref())
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    let price = predictor.predict(&record).context("Prediction failed")?;
    println!("€{}", format_price(price));

    Ok(())
}
