//! High-level profile engine API.
//!
//! [`ProfileEngine`] is what page handlers call: `resolve` before showing
//! any profile data, `request_friendship` and `respond_to_friendship` for
//! user actions. It looks users up in the [`UserDirectory`] on every call,
//! reads relationship facts in one snapshot, and never turns an error
//! into a decision.

use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

use super::navigation::NavigationMemory;
use super::types::{AuditOutcome, ProfileView};
use crate::audit::{AuditLog, NewAuditEvent, SqliteAuditLog};
use crate::config::EngineConfig;
use crate::directory::{User, UserDirectory};
use crate::error::{EngineError, Result};
use crate::friendship::{derive_phase, FriendshipMachine, PhaseOutcome, ResponseDecision};
use crate::relationship::{
    FriendRequest, RelationshipStore, RequestId, SqliteRelationshipStore, UserId,
};
use crate::visibility::{evaluate, AccessDecision, ProfileIdentity};

/// Profile visibility and friend relationship engine.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use verdant_core::directory::InMemoryUserDirectory;
/// use verdant_core::{EngineConfig, ProfileEngine};
///
/// let engine = ProfileEngine::open(EngineConfig::load()?, Arc::new(InMemoryUserDirectory::new()))?;
/// let view = engine.resolve(viewer_id, subject_id)?;
/// let stats = view.reveal(load_stats(subject_id));
/// ```
pub struct ProfileEngine {
    store: Arc<dyn RelationshipStore>,
    audit: Arc<dyn AuditLog>,
    directory: Arc<dyn UserDirectory>,
    machine: FriendshipMachine,
    navigations: Mutex<NavigationMemory>,
}

impl ProfileEngine {
    /// Opens the engine on the `SQLite` database named in `config`.
    ///
    /// The relationship store and audit log share the database file.
    /// Parent directories are created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database
    /// cannot be opened.
    pub fn open(config: EngineConfig, directory: Arc<dyn UserDirectory>) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    EngineError::Store(format!("Failed to create data directory: {e}"))
                })?;
            }
        }

        let store = SqliteRelationshipStore::new(&config.database_path, config.busy_timeout())?;
        let audit = SqliteAuditLog::new(&config.database_path, config.busy_timeout())
            .map_err(|e| EngineError::Store(e.to_string()))?;

        tracing::info!(path = %config.database_path.display(), "profile engine opened");
        Ok(Self::new(Arc::new(store), Arc::new(audit), directory, &config))
    }

    /// Creates an engine over existing collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        audit: Arc<dyn AuditLog>,
        directory: Arc<dyn UserDirectory>,
        config: &EngineConfig,
    ) -> Self {
        let machine = FriendshipMachine::new(store.clone(), config.block_vetoes_requests);
        Self {
            store,
            audit,
            directory,
            machine,
            navigations: Mutex::new(NavigationMemory::new(config.audit_navigation_capacity)),
        }
    }

    // ==================== Visibility ====================

    /// Decides what `viewer_id` may see of `subject_id`'s profile.
    ///
    /// An administrator viewing a private profile they are not friends
    /// with is recorded in the audit log on every call. Use
    /// [`resolve_for_navigation`](Self::resolve_for_navigation) when the
    /// caller may resolve the same page more than once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown users and any store
    /// error unchanged. Callers must fail closed on errors.
    pub fn resolve(&self, viewer_id: UserId, subject_id: UserId) -> Result<ProfileView> {
        self.resolve_inner(viewer_id, subject_id, None)
    }

    /// Like [`resolve`](Self::resolve), but records the admin audit event
    /// at most once per `navigation_id` for the same viewer and subject.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_for_navigation(
        &self,
        viewer_id: UserId,
        subject_id: UserId,
        navigation_id: &str,
    ) -> Result<ProfileView> {
        self.resolve_inner(viewer_id, subject_id, Some(navigation_id))
    }

    fn resolve_inner(
        &self,
        viewer_id: UserId,
        subject_id: UserId,
        navigation_id: Option<&str>,
    ) -> Result<ProfileView> {
        let viewer = self.user(viewer_id)?;
        let subject = if viewer_id == subject_id {
            viewer.clone()
        } else {
            self.user(subject_id)?
        };
        let identity = ProfileIdentity::from(&subject);

        if viewer_id == subject_id {
            return Ok(ProfileView {
                identity,
                decision: AccessDecision::Full,
                friendship: PhaseOutcome::none(),
                audit: AuditOutcome::NotRequired,
            });
        }

        let facts = self.store.snapshot(viewer_id, subject_id)?;
        let evaluation = evaluate(
            &viewer,
            &subject,
            facts.viewer_blocked_by_subject,
            facts.are_friends(),
        );
        let friendship = derive_phase(viewer_id, &facts);

        tracing::debug!(
            viewer = %viewer_id,
            subject = %subject_id,
            decision = ?evaluation.decision,
            phase = friendship.phase.as_str(),
            "profile resolved"
        );

        let audit = if evaluation.admin_bypass_non_friend {
            self.audit_admin_view(&viewer, &subject, navigation_id)
        } else {
            AuditOutcome::NotRequired
        };

        Ok(ProfileView {
            identity,
            decision: evaluation.decision,
            friendship,
            audit,
        })
    }

    fn audit_admin_view(
        &self,
        admin: &User,
        subject: &User,
        navigation_id: Option<&str>,
    ) -> AuditOutcome {
        if let Some(nav) = navigation_id {
            let claimed = self
                .navigations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .claim(admin.id, subject.id, nav);
            if !claimed {
                tracing::debug!(
                    admin = %admin.id,
                    subject = %subject.id,
                    nav,
                    "audit already recorded for navigation"
                );
                return AuditOutcome::Deduplicated;
            }
        }

        let event =
            NewAuditEvent::private_profile_view(admin.id, subject.id, &subject.display_name, false);

        match self.audit.record(event) {
            Ok(recorded) => {
                tracing::info!(
                    admin = %admin.id,
                    subject = %subject.id,
                    event = %recorded.id,
                    "admin viewed private profile"
                );
                AuditOutcome::Recorded(recorded.id)
            }
            Err(e) => {
                if let Some(nav) = navigation_id {
                    self.navigations
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .release(admin.id, subject.id, nav);
                }
                tracing::warn!(
                    admin = %admin.id,
                    subject = %subject.id,
                    error = %e,
                    "audit write failed, access stays granted"
                );
                AuditOutcome::Failed(e.to_string())
            }
        }
    }

    // ==================== Friendship ====================

    /// Sends a friend request from `viewer_id` to `subject_id`.
    ///
    /// Returns `RequestSent`, or `Friends` if `subject_id` had already
    /// asked. Repeating the call is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for unknown users and the
    /// errors listed on [`FriendshipMachine::request`].
    pub fn request_friendship(&self, viewer_id: UserId, subject_id: UserId) -> Result<PhaseOutcome> {
        if viewer_id == subject_id {
            return Err(EngineError::SelfRelationship);
        }
        let viewer = self.user(viewer_id)?;
        let subject = self.user(subject_id)?;
        self.machine.request(&viewer, &subject)
    }

    /// Accepts or rejects a request on behalf of `responder_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown responder and the
    /// errors listed on [`FriendshipMachine::respond`].
    pub fn respond_to_friendship(
        &self,
        request_id: RequestId,
        responder_id: UserId,
        decision: ResponseDecision,
    ) -> Result<PhaseOutcome> {
        self.user(responder_id)?;
        self.machine.respond(request_id, responder_id, decision)
    }

    /// Lists requests waiting for `user_id` to answer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn pending_requests_for(&self, user_id: UserId) -> Result<Vec<FriendRequest>> {
        Ok(self.store.pending_requests_for(user_id)?)
    }

    // ==================== Helpers ====================

    fn user(&self, id: UserId) -> Result<User> {
        self.directory
            .get_user(id)?
            .ok_or_else(|| EngineError::NotFound(format!("User not found: {id}")))
    }
}
