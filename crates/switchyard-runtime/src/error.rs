//! Runtime error types.

use thiserror::Error;

use switchyard_framework::RegistryError;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that can occur while building or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The route table failed validation.
    #[error("Invalid route registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
