use crate::error::{MlError, MlResult};
use crate::matrix::Matrix;

/// Trait for supervised regressors.
///
/// Every model variant in the workspace implements this; `fit` consumes a
/// fully numeric feature matrix, so categorical handling always happens
/// upstream in a separately owned preprocessor.
pub trait Estimator {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> MlResult<()>;
    fn predict(&self, x: &Matrix) -> MlResult<Vec<f64>>;
    fn is_fitted(&self) -> bool;

    /// Number of input features seen during `fit`.
    fn n_features(&self) -> Option<usize>;

    fn fit_predict(&mut self, x: &Matrix, y: &[f64]) -> MlResult<Vec<f64>> {
        self.fit(x, y)?;
        self.predict(x)
    }
}

/// Validate a training pair: non-empty, row-aligned, no NaN.
pub fn check_fit_inputs(x: &Matrix, y: &[f64]) -> MlResult<()> {
    if x.rows() == 0 || x.cols() == 0 {
        return Err(MlError::EmptyInput);
    }
    if x.rows() != y.len() {
        return Err(MlError::DimensionMismatch(format!(
            "feature matrix has {} rows but target has {} values",
            x.rows(),
            y.len()
        )));
    }
    if x.has_nan() || y.iter().any(|v| v.is_nan()) {
        return Err(MlError::InvalidOperation("input contains NaN".into()));
    }
    Ok(())
}
