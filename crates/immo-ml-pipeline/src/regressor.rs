use immo_ml_core::{Estimator, Matrix, MlResult};
use immo_ml_linear::LinearRegression;
use immo_ml_tree::{GradientBoostingRegressor, RandomForestRegressor};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::registry::ModelKind;

/// A regression model of any supported family.
///
/// Serialized externally tagged (`{"random_forest": {...}}`), which keeps
/// deserialization streaming and float values bit-exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearRegression),
    RandomForest(RandomForestRegressor),
    GradientBoosted(GradientBoostingRegressor),
}

impl Regressor {
    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::Linear(_) => ModelKind::Linear,
            Regressor::RandomForest(_) => ModelKind::RandomForest,
            Regressor::GradientBoosted(_) => ModelKind::GradientBoosted,
        }
    }

    fn inner(&self) -> &dyn Estimator {
        match self {
            Regressor::Linear(m) => m,
            Regressor::RandomForest(m) => m,
            Regressor::GradientBoosted(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Regressor::Linear(m) => m,
            Regressor::RandomForest(m) => m,
            Regressor::GradientBoosted(m) => m,
        }
    }

    pub fn to_bytes(&self) -> PipelineResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| PipelineError::InvalidModel(e.to_string()))
    }
}

impl Estimator for Regressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn n_features(&self) -> Option<usize> {
        self.inner().n_features()
    }
}
