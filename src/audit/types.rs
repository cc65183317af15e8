//! Audit event types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::relationship::UserId;

/// Identifier of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEventId(Uuid);

impl AuditEventId {
    /// Generates a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the raw bytes for storage.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Privileged action being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// An administrator opened a private profile without being a friend.
    ViewPrivateProfile,
}

impl AuditAction {
    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewPrivateProfile => "ViewPrivateProfile",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ViewPrivateProfile" => Some(Self::ViewPrivateProfile),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event to append to the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    /// Who performed the action.
    pub actor_id: UserId,
    /// What was done.
    pub action: AuditAction,
    /// Whose data was accessed.
    pub target_id: UserId,
    /// Opaque structured payload.
    pub detail: serde_json::Value,
}

impl NewAuditEvent {
    /// Builds the event for an administrator viewing a private profile.
    #[must_use]
    pub fn private_profile_view(
        actor_id: UserId,
        target_id: UserId,
        subject_display_name: &str,
        was_friend: bool,
    ) -> Self {
        Self {
            actor_id,
            action: AuditAction::ViewPrivateProfile,
            target_id,
            detail: serde_json::json!({
                "subjectDisplayName": subject_display_name,
                "viaPrivate": true,
                "wasFriend": was_friend,
            }),
        }
    }
}

/// A recorded, immutable audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub id: AuditEventId,
    /// Who performed the action.
    pub actor_id: UserId,
    /// What was done.
    pub action: AuditAction,
    /// Whose data was accessed.
    pub target_id: UserId,
    /// Opaque structured payload.
    pub detail: serde_json::Value,
    /// When the event was recorded (Unix timestamp).
    pub timestamp: i64,
}
