//! User lookup, owned by the identity/profile subsystem.
//!
//! The engine reads [`User`] records at decision time and never caches
//! them, so privacy and friend-request toggles take effect on the next
//! call.

mod error;

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

pub use self::error::{DirectoryError, Result};
use crate::relationship::UserId;

/// Role held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular member.
    Member,
    /// Administrator; may view private profiles (audited).
    Admin,
}

/// A user as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Name shown on the profile, including the private-profile notice.
    pub display_name: String,
    /// Roles held by the user.
    pub roles: BTreeSet<Role>,
    /// Profile is visible to friends only.
    pub is_private: bool,
    /// User does not accept new friend requests.
    pub disable_friend_requests: bool,
}

impl User {
    /// Creates a public member with requests enabled.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            roles: BTreeSet::from([Role::Member]),
            is_private: false,
            disable_friend_requests: false,
        }
    }

    /// Sets the privacy flag.
    #[must_use]
    pub const fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Sets whether new friend requests are refused.
    #[must_use]
    pub const fn refusing_requests(mut self, refuse: bool) -> Self {
        self.disable_friend_requests = refuse;
        self
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Returns whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns whether the user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Source of [`User`] records.
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] if the directory cannot be read.
    fn get_user(&self, id: UserId) -> Result<Option<User>>;
}

/// Directory held in memory, for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lock is poisoned.
    pub fn upsert(&self, user: User) -> Result<()> {
        self.users
            .write()
            .map_err(|e| {
                DirectoryError::Unavailable(format!("Failed to acquire directory lock: {e}"))
            })?
            .insert(user.id, user);
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().map_err(|e| {
            DirectoryError::Unavailable(format!("Failed to acquire directory lock: {e}"))
        })?;
        Ok(users.get(&id).cloned())
    }
}
