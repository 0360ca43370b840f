pub mod scaler;
pub mod encoder;
pub mod column_transformer;
pub mod error;

pub use scaler::*;
pub use encoder::*;
pub use column_transformer::*;
pub use error::{PrepError, PrepResult};
