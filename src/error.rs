//! Error types for custom data operations

use thiserror::Error;

/// Result type for custom data operations
pub type Result<T> = std::result::Result<T, CustomDataError>;

/// Failure reported by a [`RemoteStore`](crate::store::RemoteStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource or property not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the request
    #[error("Store rejected request {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Custom data error types
#[derive(Debug, Error)]
pub enum CustomDataError {
    /// Caller passed an argument the cache cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Remote store call failed
    #[error("Remote store error: {0}")]
    Remote(#[from] StoreError),

    /// Operation requires a persisted resource
    #[error("Resource has no href, cannot {0}")]
    MissingHref(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for CustomDataError {
    fn from(err: toml::de::Error) -> Self {
        CustomDataError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CustomDataError {
    fn from(err: std::io::Error) -> Self {
        CustomDataError::Config(err.to_string())
    }
}
