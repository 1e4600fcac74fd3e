//! Error types shared by the viewport crates.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Core errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A thread panicked while holding the scene lock.
    #[error("Scene lock poisoned")]
    ScenePoisoned,
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
