//! Error types for audit log operations.

use thiserror::Error;

/// Error type for audit log operations.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Event detail could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for audit log operations.
pub type Result<T> = std::result::Result<T, AuditError>;
