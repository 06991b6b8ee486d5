//! Core error types for acupress-core.
//!
//! Every fallible operation in the library reports one of the enums below;
//! `CoreError` is the umbrella used where several layers meet.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for acupress-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API errors
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

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

/// Local SQLite store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Errors talking to the remote backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, timeout or body decoding failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// Base URL or path could not be joined
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// True when the backend itself was not reachable (as opposed to refusing
    /// the request). Callers fall back to local data in that case.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::InvalidUrl(_) => false,
        }
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Session duration must be positive
    #[error("Invalid session duration: {0}s (must be greater than zero)")]
    InvalidDuration(u32),

    /// Star rating outside 1..=5
    #[error("Rating {0} out of range (expected 1-5)")]
    RatingOutOfRange(u8),

    /// Technique id not found in any catalog
    #[error("Technique {0} not found")]
    UnknownTechnique(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
