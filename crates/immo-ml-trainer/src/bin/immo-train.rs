//! Train one model per algorithm for every CSV dataset in a directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use immo_ml::preprocessing::CategoricalEncoding;
use immo_ml_trainer::{logging, DatasetTrainer, FeatureSelection, TrainerConfig};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Encoding {
    OneHot,
    Ordinal,
}

impl From<Encoding> for CategoricalEncoding {
    fn from(e: Encoding) -> Self {
        match e {
            Encoding::OneHot => CategoricalEncoding::OneHot,
            Encoding::Ordinal => CategoricalEncoding::Ordinal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "immo-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train price models for every listing dataset", long_about = None)]
struct Args {
    /// YAML trainer configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the *.csv datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output directory for models and preprocessors
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Column alias table
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Target column
    #[arg(long)]
    target: Option<String>,

    /// Model keys to train, comma separated (rf, lr, dgbm)
    #[arg(long, value_delimiter = ',')]
    models: Option<Vec<String>>,

    /// Categorical encoding applied by the preprocessor
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,

    /// Use the declared listing features instead of every column
    #[arg(long)]
    declared_features: bool,

    /// Seed for bootstrap and subsampling
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging, including per-round ensemble progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => TrainerConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }
    if let Some(path) = args.mapping {
        config.mapping_path = path;
    }
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(models) = args.models {
        config.model_types = models;
    }
    if let Some(encoding) = args.encoding {
        config.categorical_encoding = encoding.into();
    }
    if args.declared_features {
        config.feature_selection = FeatureSelection::Declared;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.verbose {
        config.verbosity = config.verbosity.max(1);
    }

    info!("immo-train v{}", env!("CARGO_PKG_VERSION"));
    info!("  Data: {}", config.data_dir.display());
    info!("  Models: {}", config.model_types.join(", "));
    info!("  Output: {}", config.model_dir.display());

    let trainer = DatasetTrainer::new(config).context("Failed to set up trainer")?;
    let report = trainer.train_all().context("Training run failed")?;

    for model in &report.trained {
        info!(
            "  {} / {}: R² = {:.3} on {} samples -> {}",
            model.dataset,
            model.model_key,
            model.r2,
            model.n_samples,
            model.model_path.display()
        );
    }
    for failure in &report.failed {
        warn!(
            "  {} / {}: {}",
            failure.dataset,
            failure.model_key.as_deref().unwrap_or("-"),
            failure.reason
        );
    }
    info!(
        "Done: {} trained, {} failed, {} skipped",
        report.trained.len(),
        report.failed.len(),
        report.skipped.len()
    );

    Ok(())
}
