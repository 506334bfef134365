//! Common error types for sradio

use thiserror::Error;

/// Common result type for sradio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the sradio crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON document (station catalog)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
