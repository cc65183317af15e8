//! Shared fixtures for engine integration tests.
//!
//! Each [`Harness`] owns an in-memory store, an in-memory audit log and a
//! user directory, so tests never share state.

#![allow(dead_code)]

use std::sync::Arc;

use verdant_core::audit::{AuditLog, MemoryAuditLog};
use verdant_core::directory::{InMemoryUserDirectory, Role, User};
use verdant_core::relationship::{SqliteRelationshipStore, UserId};
use verdant_core::{EngineConfig, ProfileEngine};

/// Engine plus handles on its collaborators.
pub struct Harness {
    pub store: Arc<SqliteRelationshipStore>,
    pub audit: Arc<MemoryAuditLog>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub engine: ProfileEngine,
}

impl Harness {
    /// Builds a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Builds a harness with the given configuration.
    pub fn with_config(config: &EngineConfig) -> Self {
        let store = Arc::new(SqliteRelationshipStore::in_memory().expect("in-memory store"));
        let audit = Arc::new(MemoryAuditLog::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let engine = ProfileEngine::new(store.clone(), audit.clone(), directory.clone(), config);
        Self {
            store,
            audit,
            directory,
            engine,
        }
    }

    /// Builds an engine sharing this harness's store and directory but
    /// writing to another audit log.
    pub fn engine_with_audit(&self, audit: Arc<dyn AuditLog>) -> ProfileEngine {
        ProfileEngine::new(
            self.store.clone(),
            audit,
            self.directory.clone(),
            &EngineConfig::default(),
        )
    }

    /// Registers a user and returns its ID.
    pub fn add(&self, user: User) -> UserId {
        let id = user.id;
        self.directory.upsert(user).expect("directory upsert");
        id
    }

    /// Replaces a stored user, e.g. after a settings change.
    pub fn update(&self, user: User) {
        self.directory.upsert(user).expect("directory upsert");
    }

    /// Registers a public member.
    pub fn member(&self, name: &str) -> UserId {
        self.add(User::new(UserId::new(), name))
    }

    /// Registers a private member.
    pub fn private_member(&self, name: &str) -> UserId {
        self.add(User::new(UserId::new(), name).private(true))
    }

    /// Registers a public administrator.
    pub fn admin(&self, name: &str) -> UserId {
        self.add(User::new(UserId::new(), name).with_role(Role::Admin))
    }
}
