//! Error types for the core library

use thiserror::Error;

/// Core error type for tapbuild operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Build mode or architecture name not recognised
    #[error("Unknown build mode: {value} (expected arm64, x86_64 or universal)")]
    UnknownBuildMode { value: String },
}

/// Result type alias for tapbuild operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
