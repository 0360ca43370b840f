use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("config error: {0}")]
    Config(String),

    #[error("alias '{alias}' is claimed by both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

pub type DataResult<T> = Result<T, DataError>;
