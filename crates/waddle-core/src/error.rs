//! Core error types for waddle-core.
//!
//! This module defines the error hierarchy using thiserror. Remote
//! failures are deliberately separate from validation failures: the
//! former are non-fatal and surfaced through outcome values, the
//! latter fail the operation outright.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for waddle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local database errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote persistence errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local SQLite cache errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Remote table-store errors.
///
/// These never abort a mutation: the local optimistic state stands and
/// the error travels back to the caller inside the outcome value.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status
    #[error("Remote API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// No user session; remote sync is gated on one
    #[error("No active session")]
    NoSession,

    /// Failed to build the blocking runtime for the REST client
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Habit title must be non-empty
    #[error("Habit title must not be empty")]
    EmptyTitle,

    /// Referenced habit does not exist
    #[error("Unknown habit: {0}")]
    UnknownHabit(String),

    /// Challenge operations require an active challenge
    #[error("No active challenge")]
    NoActiveChallenge,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
