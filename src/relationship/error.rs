//! Error types for relationship store operations.

use thiserror::Error;

use super::types::RequestStatus;

/// Error type for relationship store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not in a state that allows the transition.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status of the request.
        from: RequestStatus,
        /// Status that was requested.
        to: RequestStatus,
    },

    /// A pending request already exists for the unordered pair.
    #[error("Pending friend request already exists for this pair")]
    DuplicatePendingRequest,

    /// The friend edge pair already exists.
    #[error("Users are already friends")]
    AlreadyFriends,

    /// Both sides of the relationship are the same user.
    #[error("A user cannot relate to themselves")]
    SelfRelationship,

    /// A block edge between the pair refused the write.
    #[error("A block exists between the two users")]
    Blocked,

    /// Stored relationship data violates an invariant.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// The store could not be reached within its bounded timeout.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),
}

impl StoreError {
    /// Returns whether retrying the call later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Result type alias for relationship store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
