use immo_ml_core::{check_fit_inputs, Estimator, Matrix, MlError, MlResult};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decision_tree::DecisionTreeRegressor;

/// Gradient Boosted Trees for Regression.
///
/// Uses gradient descent in function space by sequentially fitting
/// decision trees to the residuals (negative gradient of the squared loss).
/// With `subsample < 1.0` each round sees a seeded random fraction of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub subsample: f64,
    pub seed: u64,
    /// 0 is silent; 1 and above log the training loss of every round at debug level.
    pub verbosity: u8,
    trees: Vec<DecisionTreeRegressor>,
    initial_prediction: f64,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize, subsample: f64) -> Self {
        GradientBoostingRegressor {
            n_estimators: n_estimators.max(1),
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: subsample.clamp(0.1, 1.0),
            seed: 42,
            verbosity: 0,
            trees: Vec::new(),
            initial_prediction: 0.0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(100, 0.1, 3, 1.0)
    }
}

impl Estimator for GradientBoostingRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()> {
        check_fit_inputs(x, y)?;
        if !(self.learning_rate > 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        let n = x.rows();

        self.initial_prediction = y.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![self.initial_prediction; n];
        let mut rng = StdRng::seed_from_u64(self.seed);
        let rows_per_round = ((n as f64 * self.subsample).round() as usize).clamp(1, n);

        self.trees.clear();

        for round in 0..self.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(yi, pi)| yi - pi).collect();

            let rows: Vec<usize> = if rows_per_round < n {
                let mut picked = sample(&mut rng, n, rows_per_round).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n).collect()
            };

            let mut tree = DecisionTreeRegressor::new(Some(self.max_depth), self.min_samples_split, self.min_samples_leaf)
                .with_seed(rng.gen());
            tree.fit_rows(x, &residuals, &rows)?;

            for (p, step) in predictions.iter_mut().zip(tree.predict(x)?) {
                *p += self.learning_rate * step;
            }

            if self.verbosity > 0 {
                let loss = y.iter().zip(&predictions).map(|(a, b)| (a - b) * (a - b)).sum::<f64>() / n as f64;
                debug!(round, loss, "boosting round");
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotFitted);
        }
        let mut predictions = vec![self.initial_prediction; x.rows()];
        for tree in &self.trees {
            for (p, step) in predictions.iter_mut().zip(tree.predict(x)?) {
                *p += self.learning_rate * step;
            }
        }
        Ok(predictions)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> Option<usize> {
        self.trees.first().and_then(|t| t.n_features())
    }
}
