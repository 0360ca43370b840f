pub mod matrix;
pub mod estimator;
pub mod error;

pub use matrix::Matrix;
pub use estimator::{check_fit_inputs, Estimator};
pub use error::{MlError, MlResult};
