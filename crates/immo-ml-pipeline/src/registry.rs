use std::fmt;

use immo_ml_linear::LinearRegression;
use immo_ml_tree::{GradientBoostingRegressor, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::regressor::Regressor;

/// Construction options shared by every model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOptions {
    /// 0 is silent; higher values let ensembles log training progress.
    pub verbosity: u8,
    pub seed: u64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            verbosity: 0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    RandomForest,
    GradientBoosted,
}

type Constructor = fn(&ModelOptions) -> Regressor;

/// Named constructors, keyed by the short model key used in configuration.
static REGISTRY: [(&str, ModelKind, Constructor); 3] = [
    ("lr", ModelKind::Linear, linear),
    ("rf", ModelKind::RandomForest, random_forest),
    ("dgbm", ModelKind::GradientBoosted, gradient_boosted),
];

fn linear(_: &ModelOptions) -> Regressor {
    Regressor::Linear(LinearRegression::default())
}

fn random_forest(o: &ModelOptions) -> Regressor {
    Regressor::RandomForest(
        RandomForestRegressor::default()
            .with_seed(o.seed)
            .with_verbosity(o.verbosity),
    )
}

fn gradient_boosted(o: &ModelOptions) -> Regressor {
    Regressor::GradientBoosted(
        GradientBoostingRegressor::default()
            .with_seed(o.seed)
            .with_verbosity(o.verbosity),
    )
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Linear,
        ModelKind::RandomForest,
        ModelKind::GradientBoosted,
    ];

    /// Resolve a short model key (`lr`, `rf`, `dgbm`).
    pub fn from_key(key: &str) -> PipelineResult<Self> {
        REGISTRY
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, kind, _)| *kind)
            .ok_or_else(|| PipelineError::UnknownModelType(key.to_string()))
    }

    pub fn key(self) -> &'static str {
        match self {
            ModelKind::Linear => "lr",
            ModelKind::RandomForest => "rf",
            ModelKind::GradientBoosted => "dgbm",
        }
    }

    /// A fresh, unfitted model of this kind.
    pub fn build(self, options: &ModelOptions) -> Regressor {
        match self {
            ModelKind::Linear => linear(options),
            ModelKind::RandomForest => random_forest(options),
            ModelKind::GradientBoosted => gradient_boosted(options),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Linear => "linear regression",
            ModelKind::RandomForest => "random forest",
            ModelKind::GradientBoosted => "gradient-boosted trees",
        };
        f.write_str(name)
    }
}

/// Create an unfitted model for `key` with default options.
pub fn create(key: &str) -> PipelineResult<Regressor> {
    create_with(key, &ModelOptions::default())
}

pub fn create_with(key: &str, options: &ModelOptions) -> PipelineResult<Regressor> {
    let (_, kind, ctor) = REGISTRY
        .iter()
        .find(|(k, _, _)| *k == key)
        .ok_or_else(|| PipelineError::UnknownModelType(key.to_string()))?;
    debug!(key, model = %kind, seed = options.seed, "creating model");
    Ok(ctor(options))
}
