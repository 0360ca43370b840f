//! Model registry and the serializable regressor variants it produces.

pub mod artifact;
pub mod error;
pub mod registry;
pub mod regressor;

pub use artifact::ModelArtifact;
pub use error::{PipelineError, PipelineResult};
pub use registry::{create, create_with, ModelKind, ModelOptions};
pub use regressor::Regressor;
