//! Custom error types for es-backup
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for es-backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required configuration key is absent
    #[error("Missing configuration key: {0}")]
    ConfigMissing(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for arguments and settings
    #[error("Validation error: {0}")]
    Validation(String),

    /// The snapshot API could not be reached at all
    #[error("Snapshot API unavailable during {operation} of {resource}: {message}")]
    RemoteUnavailable {
        operation: &'static str,
        resource: String,
        message: String,
    },

    /// The snapshot API answered a mutating request with a failure status
    #[error("Snapshot API rejected {operation} of {resource} (HTTP {status})")]
    RemoteRejected {
        operation: &'static str,
        resource: String,
        status: u16,
    },

    /// The snapshot API answered with a body we could not interpret
    #[error("Malformed response for {resource}: {message}")]
    MalformedResponse { resource: String, message: String },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Repository types without a settings contract
    #[error("Unsupported repository type: {0}")]
    Unsupported(String),

    /// Some aged repositories could not be removed
    #[error("{failed} of {attempted} aged repositories could not be deleted")]
    PartialPrune { failed: usize, attempted: usize },
}

impl BackupError {
    /// Create a "not found" error for repositories
    pub fn repository_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Repository",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for snapshots
    pub fn snapshot_not_found(repository: &str, snapshot: &str) -> Self {
        Self::NotFound {
            entity_type: "Snapshot",
            identifier: format!("{}/{}", repository, snapshot),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for es-backup operations
pub type BackupResult<T> = Result<T, BackupError>;
