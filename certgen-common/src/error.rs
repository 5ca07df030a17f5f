//! Common error types for the certificate generator

use thiserror::Error;

/// Common result type for certgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the certgen service
///
/// The HTTP layer maps these onto status codes: `Validation` and
/// `UnsupportedFormat` become 400, `NotFound` becomes 404, everything
/// else becomes 500.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("{0}")]
    Validation(String),

    /// Requested resource not found
    #[error("{0}")]
    NotFound(String),

    /// Unrecognized download format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Internal server error (storage or rendering failure)
    #[error("Internal error: {0}")]
    Internal(String),
}
