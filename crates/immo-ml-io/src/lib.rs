pub mod csv_io;
pub mod error;
pub mod model_io;

pub use csv_io::{read_frame, write_frame};
pub use error::{IoError, IoResult};
pub use model_io::{load_json, save_json};
