use std::path::PathBuf;

use immo_ml_data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl IoError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IoError::NotFound(path.to_path_buf())
        } else {
            IoError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type IoResult<T> = Result<T, IoError>;
