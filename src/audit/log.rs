//! Audit log sinks.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
#[cfg(any(test, feature = "test-utils"))]
use std::sync::PoisonError;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::error::{AuditError, Result};
use super::types::{AuditAction, AuditEvent, AuditEventId, NewAuditEvent};
use crate::relationship::UserId;

/// Append-only sink for privileged-access events.
pub trait AuditLog: Send + Sync {
    /// Appends an event and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be persisted.
    fn record(&self, event: NewAuditEvent) -> Result<AuditEvent>;
}

/// `SQLite`-based audit log.
///
/// The table has no update or delete path; rows are only ever inserted.
pub struct SqliteAuditLog {
    conn: Mutex<Connection>,
}

impl SqliteAuditLog {
    /// Opens (or creates) the audit log at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.initialize_schema()?;
        Ok(log)
    }

    /// Creates an in-memory audit log for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.initialize_schema()?;
        Ok(log)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS audit_events (
                id BLOB PRIMARY KEY,
                actor_id BLOB NOT NULL,
                action TEXT NOT NULL,
                target_id BLOB NOT NULL,
                detail TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS audit_events_by_target
                ON audit_events (target_id, timestamp);

            CREATE INDEX IF NOT EXISTS audit_events_by_actor
                ON audit_events (actor_id, timestamp);
            ",
        )?;

        Ok(())
    }

    /// Returns events whose target is `target_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn events_for_target(&self, target_id: UserId) -> Result<Vec<AuditEvent>> {
        self.query_events("target_id", target_id)
    }

    /// Returns events performed by `actor_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn events_by_actor(&self, actor_id: UserId) -> Result<Vec<AuditEvent>> {
        self.query_events("actor_id", actor_id)
    }

    fn query_events(&self, column: &str, user: UserId) -> Result<Vec<AuditEvent>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            r"
            SELECT id, actor_id, action, target_id, detail, timestamp
            FROM audit_events
            WHERE {column} = ?1
            ORDER BY timestamp DESC, rowid DESC
            "
        ))?;

        let rows = stmt
            .query_map(params![&user.as_bytes()[..]], |row| {
                let id: Vec<u8> = row.get(0)?;
                let actor_id: Vec<u8> = row.get(1)?;
                let action: String = row.get(2)?;
                let target_id: Vec<u8> = row.get(3)?;
                let detail: String = row.get(4)?;
                let timestamp: i64 = row.get(5)?;
                Ok((id, actor_id, action, target_id, detail, timestamp))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, actor_id, action, target_id, detail, timestamp)| {
                let id = AuditEventId::from_slice(&id)
                    .ok_or_else(|| AuditError::Storage("Invalid audit event id".to_string()))?;
                let action = AuditAction::parse(&action)
                    .ok_or_else(|| AuditError::Storage(format!("Invalid audit action: {action}")))?;

                Ok(AuditEvent {
                    id,
                    actor_id: decode_user(&actor_id)?,
                    action,
                    target_id: decode_user(&target_id)?,
                    detail: serde_json::from_str(&detail)?,
                    timestamp,
                })
            })
            .collect()
    }
}

fn decode_user(bytes: &[u8]) -> Result<UserId> {
    UserId::from_slice(bytes).map_err(|e| AuditError::Storage(e.to_string()))
}

impl AuditLog for SqliteAuditLog {
    fn record(&self, event: NewAuditEvent) -> Result<AuditEvent> {
        let detail = serde_json::to_string(&event.detail)?;
        let conn = self.lock()?;

        let recorded = AuditEvent {
            id: AuditEventId::new(),
            actor_id: event.actor_id,
            action: event.action,
            target_id: event.target_id,
            detail: event.detail,
            timestamp: chrono::Utc::now().timestamp(),
        };

        conn.execute(
            r"
            INSERT INTO audit_events (id, actor_id, action, target_id, detail, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                &recorded.id.as_bytes()[..],
                &recorded.actor_id.as_bytes()[..],
                recorded.action.as_str(),
                &recorded.target_id.as_bytes()[..],
                &detail,
                recorded.timestamp,
            ],
        )?;

        Ok(recorded)
    }
}

/// In-memory audit log for tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl AuditLog for MemoryAuditLog {
    fn record(&self, event: NewAuditEvent) -> Result<AuditEvent> {
        let recorded = AuditEvent {
            id: AuditEventId::new(),
            actor_id: event.actor_id,
            action: event.action,
            target_id: event.target_id,
            detail: event.detail,
            timestamp: chrono::Utc::now().timestamp(),
        };
        self.events
            .lock()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire log lock: {e}")))?
            .push(recorded.clone());
        Ok(recorded)
    }
}

/// Audit log whose writes always fail, for exercising failure handling.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct FailingAuditLog;

#[cfg(any(test, feature = "test-utils"))]
impl AuditLog for FailingAuditLog {
    fn record(&self, _event: NewAuditEvent) -> Result<AuditEvent> {
        Err(AuditError::Storage("audit sink unavailable".to_string()))
    }
}
