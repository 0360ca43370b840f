use tracing_subscriber::EnvFilter;

use crate::errors::{TrainerError, TrainerResult};

/// Install the global fmt subscriber.
///
/// `verbose` forces debug level; otherwise `RUST_LOG` applies, falling back
/// to `info`.
pub fn init(verbose: bool) -> TrainerResult<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| TrainerError::Config(format!("failed to set tracing subscriber: {}", e)))
}
