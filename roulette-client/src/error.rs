//! Client error types.

use roulette_features::RegistryError;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from fetching and serving feature definitions.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Definitions service answered with a non-success status.
    #[error("Response error: {status} - {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        message: String,
    },

    /// Response body did not decode.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Fetched definitions were rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Invalid client configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Background refresh is already running.
    #[error("Background refresh already running")]
    AlreadyRunning,

    /// Background refresh is not running.
    #[error("Background refresh not running")]
    NotRunning,
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
