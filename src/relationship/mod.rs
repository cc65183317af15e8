//! Durable relationship facts: block edges, friend edges and friend requests.
//!
//! The store is the only place where concurrency is resolved. Two
//! invariants are enforced at the storage level rather than by callers:
//!
//! - **Symmetric friendships**: a friendship is written as two directed
//!   rows inside one transaction and removed the same way. Finding only
//!   one of the rows is reported as [`StoreError::Integrity`].
//! - **One pending request per pair**: a unique index keyed on the
//!   canonicalized unordered pair makes crossing inserts collide, so one
//!   of them fails with [`StoreError::DuplicatePendingRequest`].
//!
//! # Architecture
//!
//! ```text
//! RelationshipStore (trait)
//!     └── SqliteRelationshipStore
//!             ├── block_edges      (blocker_id, blocked_id)
//!             ├── friend_edges     (owner_id, friend_id, since) x2 per friendship
//!             └── friend_requests  (pair_low, pair_high) unique WHERE pending
//! ```

mod error;
mod storage;
mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use storage::SqliteRelationshipStore;
pub use store::RelationshipStore;
pub use types::{
    Acceptance, BlockEdge, FriendEdge, FriendRequest, RelationshipFacts, RequestId, RequestStatus,
    UserId,
};
