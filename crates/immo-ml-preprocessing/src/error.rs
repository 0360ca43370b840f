use immo_ml_core::MlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("missing feature column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' row {row} has no value")]
    MissingValue { column: String, row: usize },

    #[error("column '{column}' expects a number, got '{value}'")]
    InvalidValue { column: String, value: String },

    #[error("preprocessor has no input columns")]
    EmptySchema,

    #[error("preprocessor not fitted")]
    NotFitted,

    #[error(transparent)]
    Ml(#[from] MlError),
}

pub type PrepResult<T> = Result<T, PrepError>;
