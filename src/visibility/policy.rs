use serde::{Deserialize, Serialize};

use crate::directory::User;
use crate::relationship::UserId;

/// Outcome of a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    /// Viewer may see the whole profile and its activity.
    Full,
    /// Viewer gets the private-profile notice only.
    Denied,
}

impl AccessDecision {
    /// Returns whether the viewer may see profile data.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Decision plus telemetry about how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// The access decision.
    pub decision: AccessDecision,
    /// An administrator saw a private profile without being a friend.
    pub admin_bypass_non_friend: bool,
}

impl Evaluation {
    const fn full() -> Self {
        Self {
            decision: AccessDecision::Full,
            admin_bypass_non_friend: false,
        }
    }

    const fn denied() -> Self {
        Self {
            decision: AccessDecision::Denied,
            admin_bypass_non_friend: false,
        }
    }
}

/// Identity fields every viewer may see, whatever the decision.
///
/// This is an allow-list: anything not named here is withheld from
/// denied viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileIdentity {
    /// Subject's user ID.
    pub id: UserId,
    /// Subject's display name.
    pub display_name: String,
    /// Whether the subject's profile is private.
    pub is_private: bool,
}

impl From<&User> for ProfileIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            is_private: user.is_private,
        }
    }
}

/// Decides whether `viewer` may see `subject`'s profile.
#[must_use]
pub fn evaluate(
    viewer: &User,
    subject: &User,
    is_blocked_by_subject: bool,
    are_friends: bool,
) -> Evaluation {
    if viewer.id == subject.id {
        return Evaluation::full();
    }

    let is_admin = viewer.is_admin();

    if is_blocked_by_subject && !is_admin {
        return Evaluation::denied();
    }

    if !subject.is_private {
        return Evaluation::full();
    }

    if is_admin {
        return Evaluation {
            decision: AccessDecision::Full,
            admin_bypass_non_friend: !are_friends,
        };
    }

    if are_friends {
        Evaluation::full()
    } else {
        Evaluation::denied()
    }
}
