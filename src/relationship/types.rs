//! Core types for relationship storage.
//!
//! Friendships are modeled in memory as a single undirected
//! [`FriendEdge`]; the store fans it out into two directed rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StoreError;

/// Identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the raw bytes for storage.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|e| StoreError::InvalidData(format!("Invalid user id: {e}")))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the raw bytes for storage.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|e| StoreError::InvalidData(format!("Invalid request id: {e}")))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Orders two users so that every unordered pair has one canonical form.
#[must_use]
pub fn canonical_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Status of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting the recipient's decision.
    Pending,
    /// Recipient accepted; a friend edge exists.
    Accepted,
    /// Recipient rejected.
    Rejected,
}

impl RequestStatus {
    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns whether the status can no longer change in place.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns whether `self -> next` is a legal transition.
    ///
    /// Only `Pending -> Accepted` and `Pending -> Rejected` are legal.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted | Self::Rejected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed block: `blocker` does not want `blocked` to access their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEdge {
    /// User who created the block.
    pub blocker_id: UserId,
    /// User who is blocked.
    pub blocked_id: UserId,
    /// When the block was created (Unix timestamp).
    pub created_at: i64,
}

/// An established, symmetric friendship.
///
/// `a` and `b` are stored in canonical order (`a < b`), so two edges for
/// the same pair always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEdge {
    /// Lower user ID of the pair.
    pub a: UserId,
    /// Higher user ID of the pair.
    pub b: UserId,
    /// When the friendship was established (Unix timestamp).
    pub since: i64,
}

impl FriendEdge {
    /// Creates an edge for the pair, canonicalizing the order.
    #[must_use]
    pub fn new(x: UserId, y: UserId, since: i64) -> Self {
        let (a, b) = canonical_pair(x, y);
        Self { a, b, since }
    }

    /// Returns whether `user` is one side of this friendship.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.a == user || self.b == user
    }
}

/// A friend request between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    /// Unique request ID.
    pub id: RequestId,
    /// User who sent the request.
    pub requester_id: UserId,
    /// User who received the request.
    pub recipient_id: UserId,
    /// Current status.
    pub status: RequestStatus,
    /// When the request was created (Unix timestamp).
    pub created_at: i64,
    /// When the request last changed status (Unix timestamp).
    pub updated_at: i64,
}

/// Relationship facts between a viewer and a subject, read at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipFacts {
    /// The subject has blocked the viewer.
    pub viewer_blocked_by_subject: bool,
    /// The viewer has blocked the subject.
    pub subject_blocked_by_viewer: bool,
    /// Friendship between the two, if established.
    pub friendship: Option<FriendEdge>,
    /// Pending request between the two, in either direction.
    pub pending_request: Option<FriendRequest>,
}

impl RelationshipFacts {
    /// Returns whether the two users are friends.
    #[must_use]
    pub const fn are_friends(&self) -> bool {
        self.friendship.is_some()
    }

    /// Returns whether either side has blocked the other.
    #[must_use]
    pub const fn any_block(&self) -> bool {
        self.viewer_blocked_by_subject || self.subject_blocked_by_viewer
    }
}

/// Result of accepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    /// The request, now `Accepted`.
    pub request: FriendRequest,
    /// The friendship that exists after acceptance.
    pub edge: FriendEdge,
    /// Whether this call wrote the edge pair. `false` means another path
    /// had already created it.
    pub created: bool,
}
