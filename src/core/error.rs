//! Error types for the server shell.

use thiserror::Error;

use crate::core::transport::TransportError;
use crate::datasource::DataSourceError;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the server shell.
///
/// Configuration and transport failures here are fatal at startup; data-fetch
/// errors never reach this type, they stay inside tool results.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors (bad `PORT`, malformed settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-layer failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Failure constructing the data source adapter.
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// I/O errors from startup plumbing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
