//! Error types for the Lexstore library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`LexstoreError`] enum. Backend execution failures propagate unchanged;
//! the store performs no retry or backoff of its own.

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Lexstore operations.
#[derive(Error, Debug)]
pub enum LexstoreError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors raised at construction or `open` time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema creation/teardown errors.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Backend statement execution errors.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Row decoding errors (unexpected column shape or value type).
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization/deserialization errors (registry payloads).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite driver errors.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with LexstoreError.
pub type Result<T> = std::result::Result<T, LexstoreError>;

impl LexstoreError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LexstoreError::Config(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        LexstoreError::Schema(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        LexstoreError::Backend(msg.into())
    }

    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        LexstoreError::Decode(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LexstoreError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = LexstoreError::config("unknown id type 'uuid'");
        assert_eq!(
            error.to_string(),
            "Configuration error: unknown id type 'uuid'"
        );

        let error = LexstoreError::backend("statement failed");
        assert_eq!(error.to_string(), "Backend error: statement failed");

        let error = LexstoreError::decode("expected integer id");
        assert_eq!(error.to_string(), "Decode error: expected integer id");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = LexstoreError::from(io_error);

        match error {
            LexstoreError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
