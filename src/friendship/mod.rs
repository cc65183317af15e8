//! Friend request lifecycle.
//!
//! ```text
//!            RequestFriendship(v, s)
//!   None ───────────────────────────▶ RequestSent ──┐
//!    ▲                                               │ RespondToFriendship(Accept)
//!    │ RespondToFriendship(Reject)                   ▼
//!    └──────────────────────────────────────────── Friends
//! ```
//!
//! The phase a viewer sees is derived from store facts on every read and
//! is only a hint for the UI; every mutation re-checks the store. When
//! both users ask each other, whichever call observes the other's pending
//! request first accepts it instead of creating a crossing request.

mod machine;
pub mod types;

pub use machine::{derive_phase, FriendshipMachine};
pub use types::{FriendshipPhase, PhaseOutcome, ResponseDecision};
