//! Engine facade.
//!
//! ```text
//! page load ──▶ resolve ──▶ UserDirectory ──▶ RelationshipStore::snapshot
//!                                │
//!                                ▼
//!                      visibility::evaluate ──▶ AuditLog (admin bypass only)
//!
//! user action ──▶ request_friendship / respond_to_friendship ──▶ FriendshipMachine
//! ```
//!
//! Other profile subsystems (stats, activity, collections) call
//! [`ProfileEngine::resolve`] first and serve their data through
//! [`ProfileView::reveal`].

mod manager;
mod navigation;
mod types;

pub use crate::directory::{InMemoryUserDirectory, Role, User, UserDirectory};
pub use manager::ProfileEngine;
pub use types::{AuditOutcome, ProfileView};
