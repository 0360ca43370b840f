//! Tabular data handling: the [`Frame`] column table, alias-based column
//! standardization and the numeric/text cleaning applied before training.

pub mod cleaner;
pub mod error;
pub mod frame;
pub mod mapper;

pub use cleaner::{clean, normalize_numeric, DatasetCleaner, NUMERIC_COLUMNS};
pub use error::{DataError, DataResult};
pub use frame::{Cell, Column, ColumnData, Frame};
pub use mapper::{standardize, AliasTable};
