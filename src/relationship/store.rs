//! The relationship store contract.

use super::error::Result;
use super::types::{
    Acceptance, FriendEdge, FriendRequest, RelationshipFacts, RequestId, RequestStatus, UserId,
};

/// Durable repository of block edges, friend edges and friend requests.
///
/// Implementations own every uniqueness and atomicity guarantee. Callers
/// never need to hold locks across calls; they react to the errors
/// returned here instead.
pub trait RelationshipStore: Send + Sync {
    /// Returns whether `blocker_id` has blocked `blocked_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn is_blocked(&self, blocker_id: UserId, blocked_id: UserId) -> Result<bool>;

    /// Returns the friendship between `a` and `b`, if both directed rows exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if only one directed row exists.
    ///
    /// [`StoreError::Integrity`]: super::StoreError::Integrity
    fn friendship(&self, a: UserId, b: UserId) -> Result<Option<FriendEdge>>;

    /// Returns whether `a` and `b` are friends.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if only one directed row exists.
    ///
    /// [`StoreError::Integrity`]: super::StoreError::Integrity
    fn are_friends(&self, a: UserId, b: UserId) -> Result<bool> {
        Ok(self.friendship(a, b)?.is_some())
    }

    /// Finds the pending request between `a` and `b` in either direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn find_pending_request(&self, a: UserId, b: UserId) -> Result<Option<FriendRequest>>;

    /// Fetches a request by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_request(&self, id: RequestId) -> Result<Option<FriendRequest>>;

    /// Lists pending requests addressed to `recipient_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn pending_requests_for(&self, recipient_id: UserId) -> Result<Vec<FriendRequest>>;

    /// Creates a new pending request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePendingRequest`] if a pending request
    /// already exists for the unordered pair.
    ///
    /// [`StoreError::DuplicatePendingRequest`]: super::StoreError::DuplicatePendingRequest
    fn create_request(&self, requester_id: UserId, recipient_id: UserId) -> Result<FriendRequest>;

    /// Moves a pending request to a terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown IDs and
    /// [`StoreError::InvalidTransition`] unless the request is pending and
    /// `status` is terminal.
    ///
    /// [`StoreError::NotFound`]: super::StoreError::NotFound
    /// [`StoreError::InvalidTransition`]: super::StoreError::InvalidTransition
    fn transition_request(&self, id: RequestId, status: RequestStatus) -> Result<FriendRequest>;

    /// Creates both directed friend rows for `a` and `b` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyFriends`] if the pair already exists.
    ///
    /// [`StoreError::AlreadyFriends`]: super::StoreError::AlreadyFriends
    fn create_friend_edge_pair(&self, a: UserId, b: UserId) -> Result<FriendEdge>;

    /// Accepts a pending request and creates the friendship in one transaction.
    ///
    /// An already existing friendship is not an error; it is reported
    /// through [`Acceptance::created`]. With `veto_on_block` set, a block in
    /// either direction is checked inside the same transaction and the
    /// request stays pending.
    ///
    /// # Errors
    ///
    /// Same as [`transition_request`](Self::transition_request), plus
    /// [`StoreError::Blocked`] when `veto_on_block` is set and a block exists.
    ///
    /// [`StoreError::Blocked`]: super::StoreError::Blocked
    fn accept_request(&self, id: RequestId, veto_on_block: bool) -> Result<Acceptance>;

    /// Reads every fact needed for one visibility decision at a single point in time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if the friendship is one-sided.
    ///
    /// [`StoreError::Integrity`]: super::StoreError::Integrity
    fn snapshot(&self, viewer: UserId, subject: UserId) -> Result<RelationshipFacts>;
}
