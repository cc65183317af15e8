//! Engine facade types.

use serde::{Deserialize, Serialize};

use crate::audit::AuditEventId;
use crate::friendship::PhaseOutcome;
use crate::visibility::{AccessDecision, ProfileIdentity};

/// What happened to the audit write for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    /// The access was not privileged.
    NotRequired,
    /// An event was written.
    Recorded(AuditEventId),
    /// The same navigation already produced an event.
    Deduplicated,
    /// The write failed. Access was still granted.
    Failed(String),
}

/// Result of resolving a viewer's access to a subject's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    /// Allow-listed identity fields, shown whatever the decision.
    pub identity: ProfileIdentity,
    /// Whether profile data may be shown.
    pub decision: AccessDecision,
    /// Friendship phase from the viewer's side, for the UI only.
    pub friendship: PhaseOutcome,
    /// Audit write status for privileged access.
    pub audit: AuditOutcome,
}

impl ProfileView {
    /// Returns `data` only if the viewer has full access.
    ///
    /// Subsystems serving stats, activity or other profile data pass
    /// their payload through here instead of branching on `decision`.
    #[must_use]
    pub fn reveal<T>(&self, data: T) -> Option<T> {
        self.decision.is_full().then_some(data)
    }

    /// When the viewer and subject became friends.
    #[must_use]
    pub const fn friends_since(&self) -> Option<i64> {
        self.friendship.friends_since
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friendship::FriendshipPhase;
    use crate::relationship::UserId;

    fn view(decision: AccessDecision) -> ProfileView {
        ProfileView {
            identity: ProfileIdentity {
                id: UserId::new(),
                display_name: "Sage".to_string(),
                is_private: true,
            },
            decision,
            friendship: PhaseOutcome::friends(1_700_000_000),
            audit: AuditOutcome::NotRequired,
        }
    }

    #[test]
    fn reveal_follows_decision() {
        assert_eq!(view(AccessDecision::Full).reveal(42), Some(42));
        assert_eq!(view(AccessDecision::Denied).reveal(42), None);
    }

    #[test]
    fn friends_since_comes_from_phase() {
        let view = view(AccessDecision::Full);
        assert_eq!(view.friendship.phase, FriendshipPhase::Friends);
        assert_eq!(view.friends_since(), Some(1_700_000_000));
    }
}
