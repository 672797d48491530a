//! Error types for pre-ingest client operations.
//!
//! This module defines [`PreingestError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Transport failures are transient: callers retry on the next tick
//! - Server-reported failures carry the server's detail text
//! - Data defects in step definitions are logged by the resolver and
//!   reconciler rather than returned, so the watch loop keeps running
//! - Use `anyhow::Error` (via `PreingestError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::api::SettingsKey;

/// Core error type for pre-ingest client operations.
#[derive(Debug, Error)]
pub enum PreingestError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A step id that is not part of the catalog.
    #[error("Unknown step: {id}")]
    UnknownStep { id: String },

    /// The request never completed.
    #[error("Failed to connect to server: {message}")]
    Connection { message: String },

    /// The server answered with a non-success status.
    #[error("Error {status} for {path}: {detail}")]
    Http {
        status: u16,
        path: String,
        detail: String,
    },

    /// The server answered but the body could not be parsed.
    #[error("Failed to parse response for {path}: {message}")]
    Parse { path: String, message: String },

    /// The server does not know the session.
    #[error("No such session: {session_id}")]
    NoSuchSession { session_id: String },

    /// No terminal status was observed within the polling budget.
    #[error("No result after {attempts} attempts in {minutes} minutes")]
    Timeout { attempts: u32, minutes: i64 },

    /// Execution was requested while required settings have no value.
    #[error("Missing settings: {}", join_keys(.keys))]
    MissingSettings { keys: Vec<SettingsKey> },

    /// A settings change touches a value consumed by a completed step.
    #[error("Setting '{key}' is locked by a completed step")]
    SettingLocked { key: SettingsKey },

    /// A step cannot be selected because a completed step pins it.
    #[error("Step '{id}' cannot be selected again")]
    SelectionLocked { id: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PreingestError {
    /// Whether the failure is a connectivity problem worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, PreingestError::Connection { .. })
    }
}

fn join_keys(keys: &[SettingsKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for pre-ingest operations.
pub type Result<T> = std::result::Result<T, PreingestError>;
