use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Save any serializable value as pretty JSON, creating parent directories.
/// An existing file is overwritten.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> IoResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IoError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| IoError::io(path, e))?;
    debug!(path = %path.display(), "artifact saved");
    Ok(())
}

/// Load a JSON artifact. A missing file is [`IoError::NotFound`].
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> IoResult<T> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}
