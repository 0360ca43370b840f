use thiserror::Error;

/// Core error type for matrix operations and estimators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MlError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Index out of bounds: ({row}, {col}) for matrix of shape ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Singular matrix: cannot invert or decompose")]
    SingularMatrix,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Model not fitted")]
    NotFitted,

    #[error("Empty input")]
    EmptyInput,
}

pub type MlResult<T> = Result<T, MlError>;
