use immo_ml_core::{check_fit_inputs, Estimator, Matrix, MlError, MlResult};
use immo_ml_linalg::solve;
use serde::{Deserialize, Serialize};

/// Ordinary Least Squares linear regression.
///
/// Fits `y = Xw + b` through the normal equation on centered data:
/// `w = (XcᵀXc + λI)⁻¹ Xcᵀyc`, `b = ȳ - x̄·w`.
///
/// `λ` is a relative jitter (`l2_jitter × trace(XcᵀXc) / p`), small enough to
/// leave well-conditioned fits unchanged while keeping one-hot blocks, whose
/// columns always sum to one, solvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub fit_intercept: bool,
    pub l2_jitter: f64,
    pub weights: Option<Vec<f64>>,
    pub bias: f64,
}

impl LinearRegression {
    pub const DEFAULT_JITTER: f64 = 1e-10;

    pub fn new(fit_intercept: bool) -> Self {
        LinearRegression {
            fit_intercept,
            l2_jitter: Self::DEFAULT_JITTER,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Estimator for LinearRegression {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()> {
        check_fit_inputs(x, y)?;
        let (n, p) = x.shape();

        let (x_mean, y_mean) = if self.fit_intercept {
            (x.mean_cols()?, y.iter().sum::<f64>() / n as f64)
        } else {
            (vec![0.0; p], 0.0)
        };

        let mut centered = x.clone();
        for i in 0..n {
            for (j, mean) in x_mean.iter().enumerate() {
                centered.set(i, j, x.at(i, j) - mean)?;
            }
        }
        let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        let xt = centered.t();
        let mut xtx = xt.matmul(&centered)?;
        let xty = xt.matvec(&y_centered)?;

        let trace: f64 = (0..p).map(|j| xtx.at(j, j)).sum();
        let lambda = self.l2_jitter * (trace / p as f64).max(1.0);
        for j in 0..p {
            let d = xtx.at(j, j);
            xtx.set(j, j, d + lambda)?;
        }

        let w = solve(&xtx, &xty)?;
        self.bias = y_mean - x_mean.iter().zip(&w).map(|(m, wj)| m * wj).sum::<f64>();
        self.weights = Some(w);
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        let w = self.weights.as_ref().ok_or(MlError::NotFitted)?;
        let pred = x.matvec(w)?;
        Ok(pred.into_iter().map(|v| v + self.bias).collect())
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    fn n_features(&self) -> Option<usize> {
        self.weights.as_ref().map(Vec::len)
    }
}
