//! Error types for user lookup.

use thiserror::Error;

/// Error type for user directory operations.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The directory could not be reached or read.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for user directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
