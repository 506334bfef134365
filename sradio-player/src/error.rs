//! Error types for sradio-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for sradio-player
#[derive(Error, Debug)]
pub enum Error {
    /// Asset validation failed or asset missing
    #[error("Asset unplayable: {0}")]
    AssetUnplayable(String),

    /// HTTP transport errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Media primitive errors
    #[error("Stream source error: {0}")]
    Source(String),

    /// The engine's owner task is no longer running
    #[error("Playback engine is shut down")]
    EngineClosed,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors from the shared library (config, catalog, URLs)
    #[error(transparent)]
    Common(#[from] sradio_common::Error),
}

/// Convenience Result type using sradio-player Error
pub type Result<T> = std::result::Result<T, Error>;
