//! Append-only audit trail for privileged access.
//!
//! The engine writes here when an administrator views a private profile
//! they are not friends with. The engine never reads or mutates events;
//! review tooling uses the read methods on [`SqliteAuditLog`].
//!
//! A failed write is reported to the caller but never reverses an access
//! decision that was already made.

mod error;
mod log;
pub mod types;

pub use error::{AuditError, Result};
#[cfg(any(test, feature = "test-utils"))]
pub use log::{FailingAuditLog, MemoryAuditLog};
pub use log::{AuditLog, SqliteAuditLog};
pub use types::{AuditAction, AuditEvent, AuditEventId, NewAuditEvent};
