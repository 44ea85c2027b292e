//! Error types for secret storage operations.

use thiserror::Error;

/// Result type for secret storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while storing, reading, or deleting secrets.
///
/// Validation rejections on `write` are not represented here: the facade and
/// the database backend return `Ok(false)` for those so that callers can
/// distinguish "your input was malformed" from "the backend is broken".
#[derive(Error, Debug)]
pub enum Error {
    /// Secret not found in the active backend.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// Database and storage errors.
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Vault API errors (network failures, auth failures, bad responses).
    #[error("Vault error: {message}")]
    Vault { message: String },

    /// Decryption failed: wrong or rotated key, or a tampered payload.
    ///
    /// Always a hard failure; a secret that cannot be decrypted is never
    /// returned as garbage or an empty value.
    #[error("Decryption failed: {context}")]
    Decryption { context: String },

    /// Invalid input that cannot be expressed as a boolean write rejection
    /// (malformed configuration values, impossible row shapes).
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Internal error (should-not-happen states in the crypto plumbing).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a vault error.
    pub fn vault(message: impl Into<String>) -> Self {
        Self::Vault { message: message.into() }
    }

    /// Create a decryption error.
    pub fn decryption(context: impl Into<String>) -> Self {
        Self::Decryption { context: context.into() }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}
