//! Core error types for tasksync-core.
//!
//! Nothing in the mutation path surfaces these to the caller; they exist for
//! configuration, settings and the backend adapters, whose failures are
//! converted into tagged outcomes and log lines one layer up.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tasksync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote backend errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Settings provider errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

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

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors from the remote persistence backend.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend rejected request (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// The configured backend URL cannot be used.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Settings provider errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The layer does not accept writes.
    #[error("Settings layer '{0}' is read-only")]
    ReadOnly(&'static str),

    /// No layer is available to write to.
    #[error("No writable settings layer configured")]
    NoWritableLayer,

    /// Backing file could not be read or written.
    #[error("Settings file {path}: {message}")]
    File { path: PathBuf, message: String },

    /// The remote settings table failed.
    #[error("Remote settings: {0}")]
    Remote(#[from] SyncError),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty value where one is required
    #[error("'{0}' must not be empty")]
    Empty(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
