//! Error types for token storage operations

/// Errors from loading or persisting stored tokens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("token parse error: {0}")]
    Parse(String),
}

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;
