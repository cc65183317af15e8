//! Error types for engine operations.
//!
//! A [`Denied`](crate::visibility::AccessDecision::Denied) decision is a
//! normal outcome, never an error. Errors here mean the engine could not
//! establish the facts, and callers must fail closed on them without
//! telling the user a profile is private.

use thiserror::Error;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::relationship::{RequestStatus, StoreError};

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unknown user or request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor is not allowed to perform the operation.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Request is no longer pending.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status of the request.
        from: RequestStatus,
        /// Status that was requested.
        to: RequestStatus,
    },

    /// Recipient does not accept new friend requests.
    #[error("Recipient does not accept friend requests")]
    RequestsDisabled,

    /// A block between the two users prevents the operation.
    #[error("Blocked: {0}")]
    Blocked(String),

    /// Both sides of the relationship are the same user.
    #[error("A user cannot befriend themselves")]
    SelfRelationship,

    /// A concurrent change won; re-read state and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored relationship data violates an invariant.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// The store is temporarily unreachable.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// The user directory failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Engine settings were rejected before the store was opened.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Returns whether the same call may succeed later without any change.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Directory(_))
    }

    /// Returns whether the caller should re-read state and try again.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            StoreError::DuplicatePendingRequest => {
                Self::Conflict("pending friend request already exists".to_string())
            }
            StoreError::AlreadyFriends => Self::Conflict("users are already friends".to_string()),
            StoreError::SelfRelationship => Self::SelfRelationship,
            StoreError::Blocked => {
                Self::Blocked("a block exists between the two users".to_string())
            }
            StoreError::Integrity(msg) => Self::Integrity(msg),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            err @ (StoreError::InvalidData(_) | StoreError::Database(_)) => {
                Self::Store(err.to_string())
            }
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
