//! Friendship phase types.

use serde::{Deserialize, Serialize};

use crate::relationship::{RequestId, RequestStatus};

/// Friendship state between a viewer and a subject, from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendshipPhase {
    /// No friendship and no pending request.
    None,
    /// The viewer asked the subject and is waiting.
    RequestSent,
    /// The subject asked the viewer and is waiting.
    RequestReceived,
    /// The two are friends.
    Friends,
}

impl FriendshipPhase {
    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RequestSent => "request_sent",
            Self::RequestReceived => "request_received",
            Self::Friends => "friends",
        }
    }
}

/// A recipient's answer to a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseDecision {
    /// Become friends.
    Accept,
    /// Decline the request.
    Reject,
}

impl ResponseDecision {
    /// Request status this decision moves to.
    #[must_use]
    pub const fn target_status(&self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// Phase after an operation, with the details the UI needs to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    /// Current phase from the acting user's side.
    pub phase: FriendshipPhase,
    /// When the friendship started, for [`FriendshipPhase::Friends`].
    pub friends_since: Option<i64>,
    /// The pending request, for `RequestSent` and `RequestReceived`.
    pub request_id: Option<RequestId>,
}

impl PhaseOutcome {
    /// No relationship.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            phase: FriendshipPhase::None,
            friends_since: None,
            request_id: None,
        }
    }

    /// Friends since `since`.
    #[must_use]
    pub const fn friends(since: i64) -> Self {
        Self {
            phase: FriendshipPhase::Friends,
            friends_since: Some(since),
            request_id: None,
        }
    }

    /// Waiting on a request the acting user sent.
    #[must_use]
    pub const fn sent(request_id: RequestId) -> Self {
        Self {
            phase: FriendshipPhase::RequestSent,
            friends_since: None,
            request_id: Some(request_id),
        }
    }

    /// Waiting on a request the acting user received.
    #[must_use]
    pub const fn received(request_id: RequestId) -> Self {
        Self {
            phase: FriendshipPhase::RequestReceived,
            friends_since: None,
            request_id: Some(request_id),
        }
    }
}
