//! Friend request state machine over a [`RelationshipStore`].

use std::sync::Arc;

use super::types::{PhaseOutcome, ResponseDecision};
use crate::directory::User;
use crate::error::{EngineError, Result};
use crate::relationship::{
    RelationshipFacts, RelationshipStore, RequestId, RequestStatus, StoreError, UserId,
};

/// Derives the phase `viewer` sees from relationship facts.
#[must_use]
pub fn derive_phase(viewer: UserId, facts: &RelationshipFacts) -> PhaseOutcome {
    if let Some(edge) = facts.friendship {
        return PhaseOutcome::friends(edge.since);
    }

    match &facts.pending_request {
        Some(request) if request.requester_id == viewer => PhaseOutcome::sent(request.id),
        Some(request) => PhaseOutcome::received(request.id),
        None => PhaseOutcome::none(),
    }
}

/// One pass of a request attempt.
enum Attempt {
    Done(PhaseOutcome),
    /// A concurrent change invalidated what we read.
    Raced(&'static str),
}

/// Drives friend requests from creation to friendship or rejection.
///
/// The machine holds no state of its own. Races are settled by the
/// store's uniqueness constraints; the machine re-reads once after
/// losing one and otherwise reports [`EngineError::Conflict`].
pub struct FriendshipMachine {
    store: Arc<dyn RelationshipStore>,
    block_vetoes_requests: bool,
}

impl FriendshipMachine {
    /// Creates a machine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RelationshipStore>, block_vetoes_requests: bool) -> Self {
        Self {
            store,
            block_vetoes_requests,
        }
    }

    /// Reads the current phase between `viewer` and `subject`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or is inconsistent.
    pub fn phase_between(&self, viewer: UserId, subject: UserId) -> Result<PhaseOutcome> {
        let facts = self.store.snapshot(viewer, subject)?;
        Ok(derive_phase(viewer, &facts))
    }

    /// Asks `subject` to become friends with `viewer`.
    ///
    /// Idempotent: repeating the call returns the same phase without
    /// creating another request. If `subject` already asked `viewer`,
    /// that request is accepted instead.
    ///
    /// # Errors
    ///
    /// - [`EngineError::SelfRelationship`] if both users are the same
    /// - [`EngineError::Blocked`] if a block exists and blocks veto requests
    /// - [`EngineError::RequestsDisabled`] if a new request would be needed
    ///   and `subject` refuses requests
    /// - [`EngineError::Conflict`] if a concurrent change won twice in a row
    pub fn request(&self, viewer: &User, subject: &User) -> Result<PhaseOutcome> {
        if viewer.id == subject.id {
            return Err(EngineError::SelfRelationship);
        }

        let mut attempt = self.try_request(viewer, subject)?;
        if let Attempt::Raced(reason) = attempt {
            tracing::warn!(
                viewer = %viewer.id,
                subject = %subject.id,
                reason,
                "friend request raced, re-reading once"
            );
            attempt = self.try_request(viewer, subject)?;
        }

        match attempt {
            Attempt::Done(outcome) => Ok(outcome),
            Attempt::Raced(reason) => Err(EngineError::Conflict(reason.to_string())),
        }
    }

    fn try_request(&self, viewer: &User, subject: &User) -> Result<Attempt> {
        let facts = self.store.snapshot(viewer.id, subject.id)?;

        if let Some(edge) = facts.friendship {
            tracing::debug!(viewer = %viewer.id, subject = %subject.id, "already friends");
            return Ok(Attempt::Done(PhaseOutcome::friends(edge.since)));
        }

        if self.block_vetoes_requests && facts.any_block() {
            return Err(EngineError::Blocked(
                "a block exists between these users".to_string(),
            ));
        }

        match facts.pending_request {
            Some(request) if request.requester_id == subject.id => {
                match self
                    .store
                    .accept_request(request.id, self.block_vetoes_requests)
                {
                    Ok(acceptance) => {
                        tracing::info!(
                            viewer = %viewer.id,
                            subject = %subject.id,
                            request = %request.id,
                            "crossing friend request collapsed into acceptance"
                        );
                        Ok(Attempt::Done(PhaseOutcome::friends(acceptance.edge.since)))
                    }
                    Err(StoreError::InvalidTransition { .. } | StoreError::NotFound(_)) => {
                        Ok(Attempt::Raced("crossing request changed while collapsing"))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Some(request) => {
                tracing::debug!(request = %request.id, "friend request already pending");
                Ok(Attempt::Done(PhaseOutcome::sent(request.id)))
            }
            None => {
                if subject.disable_friend_requests {
                    return Err(EngineError::RequestsDisabled);
                }

                match self.store.create_request(viewer.id, subject.id) {
                    Ok(request) => {
                        tracing::info!(
                            requester = %viewer.id,
                            recipient = %subject.id,
                            request = %request.id,
                            "friend request created"
                        );
                        Ok(Attempt::Done(PhaseOutcome::sent(request.id)))
                    }
                    Err(StoreError::DuplicatePendingRequest) => {
                        Ok(Attempt::Raced("pending request created concurrently"))
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Answers a pending request on behalf of `responder_id`.
    ///
    /// Returns the phase from the responder's side: `Friends` after
    /// accepting, `None` after rejecting.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] for unknown requests
    /// - [`EngineError::NotAuthorized`] if `responder_id` is not the recipient
    /// - [`EngineError::InvalidTransition`] if the request is not pending
    /// - [`EngineError::Blocked`] when accepting across a block and blocks
    ///   veto requests
    pub fn respond(
        &self,
        request_id: RequestId,
        responder_id: UserId,
        decision: ResponseDecision,
    ) -> Result<PhaseOutcome> {
        let request = self
            .store
            .get_request(request_id)?
            .ok_or_else(|| EngineError::NotFound(format!("Friend request not found: {request_id}")))?;

        if request.recipient_id != responder_id {
            return Err(EngineError::NotAuthorized(
                "only the recipient can answer a friend request".to_string(),
            ));
        }

        if request.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: request.status,
                to: decision.target_status(),
            });
        }

        match decision {
            ResponseDecision::Accept => {
                let acceptance = match self
                    .store
                    .accept_request(request_id, self.block_vetoes_requests)
                {
                    Ok(acceptance) => acceptance,
                    Err(StoreError::Blocked) => {
                        return Err(EngineError::Blocked(
                            "a block was added after the request was sent".to_string(),
                        ));
                    }
                    Err(e) => return Err(e.into()),
                };
                if !acceptance.created {
                    tracing::debug!(
                        request = %request_id,
                        "friend edge already existed, acceptance still succeeds"
                    );
                }
                tracing::info!(
                    requester = %request.requester_id,
                    recipient = %request.recipient_id,
                    request = %request_id,
                    "friend request accepted"
                );
                Ok(PhaseOutcome::friends(acceptance.edge.since))
            }
            ResponseDecision::Reject => {
                self.store
                    .transition_request(request_id, RequestStatus::Rejected)?;
                tracing::info!(
                    requester = %request.requester_id,
                    recipient = %request.recipient_id,
                    request = %request_id,
                    "friend request rejected"
                );
                Ok(PhaseOutcome::none())
            }
        }
    }
}
