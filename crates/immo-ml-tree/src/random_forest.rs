use immo_ml_core::{check_fit_inputs, Estimator, Matrix, MlError, MlResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decision_tree::DecisionTreeRegressor;

/// Random Forest Regressor: bagged CART trees averaged at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of features tried at each split (1.0 = all).
    pub max_features_ratio: f64,
    pub bootstrap: bool,
    pub seed: u64,
    pub verbosity: u8,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, max_features_ratio: f64) -> Self {
        RandomForestRegressor {
            n_estimators: n_estimators.max(1),
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features_ratio: max_features_ratio.clamp(f64::EPSILON, 1.0),
            bootstrap: true,
            seed: 42,
            verbosity: 0,
            trees: Vec::new(),
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

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100, None, 1.0)
    }
}

impl Estimator for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()> {
        check_fit_inputs(x, y)?;
        let (n, p) = x.shape();
        let max_features = ((p as f64 * self.max_features_ratio).ceil() as usize).clamp(1, p);
        let max_features = (max_features < p).then_some(max_features);

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees.clear();

        for t in 0..self.n_estimators {
            let rows: Vec<usize> = if self.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut tree = DecisionTreeRegressor::new(self.max_depth, self.min_samples_split, self.min_samples_leaf)
                .with_max_features(max_features)
                .with_seed(rng.gen());
            tree.fit_rows(x, y, &rows)?;

            if self.verbosity > 0 {
                debug!(tree = t, nodes = tree.node_count(), depth = tree.depth(), "forest tree fitted");
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotFitted);
        }
        let mut sums = vec![0.0; x.rows()];
        for tree in &self.trees {
            for (s, p) in sums.iter_mut().zip(tree.predict(x)?) {
                *s += p;
            }
        }
        let k = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / k).collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> Option<usize> {
        self.trees.first().and_then(|t| t.n_features())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_data() -> (Matrix, Vec<f64>) {
        let x = Matrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![1.0, 1.0],
            vec![5.0, 5.0],
            vec![5.5, 5.5],
            vec![6.0, 6.0],
        ])
        .unwrap();
        (x, vec![100.0, 100.0, 100.0, 300.0, 300.0, 300.0])
    }

    #[test]
    fn test_random_forest_regressor() {
        let (x, y) = step_data();
        let mut rf = RandomForestRegressor::new(20, None, 1.0);
        rf.fit(&x, &y).unwrap();
        assert_eq!(rf.n_trees(), 20);

        let pred = rf.predict(&x).unwrap();
        for i in 0..6 {
            assert!((pred[i] - y[i]).abs() < 60.0, "prediction {} vs {}", pred[i], y[i]);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = step_data();
        let mut a = RandomForestRegressor::new(5, None, 0.5).with_seed(7);
        let mut b = RandomForestRegressor::new(5, None, 0.5).with_seed(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_without_bootstrap_memorizes() {
        let (x, y) = step_data();
        let mut rf = RandomForestRegressor::new(3, None, 1.0);
        rf.bootstrap = false;
        rf.fit(&x, &y).unwrap();
        for (p, t) in rf.predict(&x).unwrap().iter().zip(&y) {
            assert_relative_eq!(*p, *t);
        }
    }

    #[test]
    fn test_serde_round_trip_is_exact() {
        let (x, y) = step_data();
        let mut rf = RandomForestRegressor::new(10, None, 1.0);
        rf.fit(&x, &y).unwrap();
        let json = serde_json::to_string(&rf).unwrap();
        let back: RandomForestRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(rf.predict(&x).unwrap(), back.predict(&x).unwrap());
    }
}
