//! `SQLite` storage for relationship facts.
//!
//! Friendships are stored as two directed rows in `friend_edges` and are
//! always written and deleted inside one transaction. Pending requests are
//! guarded by a partial unique index on the canonicalized pair, so two
//! crossing inserts for the same users collide no matter who sent first.

// SQLite operations need to hold the lock for the duration of the operation.
// Dropping the guard earlier would require restructuring all methods.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::error::{Result, StoreError};
use super::store::RelationshipStore;
use super::types::{
    canonical_pair, Acceptance, BlockEdge, FriendEdge, FriendRequest, RelationshipFacts,
    RequestId, RequestStatus, UserId,
};

const REQUEST_COLUMNS: &str =
    "id, requester_id, recipient_id, status, created_at, updated_at";

/// `SQLite`-based relationship store.
///
/// Thread-safe wrapper around a `SQLite` connection. Several instances may
/// point at the same database file; the schema constraints keep them
/// consistent.
pub struct SqliteRelationshipStore {
    conn: Mutex<Connection>,
}

impl SqliteRelationshipStore {
    /// Opens (or creates) the store at the given path.
    ///
    /// `busy_timeout` bounds how long a call waits for a competing writer
    /// before failing with [`StoreError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire database lock: {e}")))
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            -- Directed blocks, written by moderation
            CREATE TABLE IF NOT EXISTS block_edges (
                blocker_id BLOB NOT NULL,
                blocked_id BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (blocker_id, blocked_id),
                CHECK (blocker_id <> blocked_id)
            );

            -- Two mirrored rows per friendship
            CREATE TABLE IF NOT EXISTS friend_edges (
                owner_id BLOB NOT NULL,
                friend_id BLOB NOT NULL,
                since INTEGER NOT NULL,
                PRIMARY KEY (owner_id, friend_id),
                CHECK (owner_id <> friend_id)
            );

            -- Full request history; terminal rows are never rewritten
            CREATE TABLE IF NOT EXISTS friend_requests (
                id BLOB PRIMARY KEY,
                requester_id BLOB NOT NULL,
                recipient_id BLOB NOT NULL,
                pair_low BLOB NOT NULL,
                pair_high BLOB NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                CHECK (requester_id <> recipient_id)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS friend_requests_one_pending
                ON friend_requests (pair_low, pair_high)
                WHERE status = 'pending';

            CREATE INDEX IF NOT EXISTS friend_requests_by_pair
                ON friend_requests (pair_low, pair_high, created_at);

            CREATE INDEX IF NOT EXISTS friend_requests_by_recipient
                ON friend_requests (recipient_id, status);
            ",
        )?;

        Ok(())
    }

    // ==================== Moderation Operations ====================

    /// Records that `blocker_id` blocks `blocked_id`.
    ///
    /// Blocking twice keeps the original edge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SelfRelationship`] for self-blocks, or an error
    /// if the database operation fails.
    pub fn add_block(&self, blocker_id: UserId, blocked_id: UserId) -> Result<BlockEdge> {
        if blocker_id == blocked_id {
            return Err(StoreError::SelfRelationship);
        }

        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r"
            INSERT INTO block_edges (blocker_id, blocked_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(blocker_id, blocked_id) DO NOTHING
            ",
            params![&blocker_id.as_bytes()[..], &blocked_id.as_bytes()[..], now],
        )?;

        let created_at: i64 = conn.query_row(
            "SELECT created_at FROM block_edges WHERE blocker_id = ?1 AND blocked_id = ?2",
            params![&blocker_id.as_bytes()[..], &blocked_id.as_bytes()[..]],
            |row| row.get(0),
        )?;

        Ok(BlockEdge {
            blocker_id,
            blocked_id,
            created_at,
        })
    }

    /// Removes a block. Returns whether a block existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_block(&self, blocker_id: UserId, blocked_id: UserId) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM block_edges WHERE blocker_id = ?1 AND blocked_id = ?2",
            params![&blocker_id.as_bytes()[..], &blocked_id.as_bytes()[..]],
        )?;
        Ok(rows > 0)
    }

    // ==================== Friendship Maintenance ====================

    /// Deletes both directed rows of a friendship in one transaction.
    ///
    /// Returns whether a friendship existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] (and deletes nothing) if only one
    /// directed row exists.
    pub fn remove_friend_edge_pair(&self, a: UserId, b: UserId) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if query_friendship(&tx, a, b)?.is_none() {
            return Ok(false);
        }

        tx.execute(
            r"
            DELETE FROM friend_edges
            WHERE (owner_id = ?1 AND friend_id = ?2)
               OR (owner_id = ?2 AND friend_id = ?1)
            ",
            params![&a.as_bytes()[..], &b.as_bytes()[..]],
        )?;
        tx.commit()?;

        tracing::info!(user_a = %a, user_b = %b, "friend edge pair removed");
        Ok(true)
    }

    /// Lists the friendships of `user`, newest first.
    ///
    /// Only pairs with both directed rows are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn friends_of(&self, user: UserId) -> Result<Vec<FriendEdge>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r"
            SELECT f.friend_id, f.since
            FROM friend_edges f
            JOIN friend_edges m
              ON m.owner_id = f.friend_id AND m.friend_id = f.owner_id
            WHERE f.owner_id = ?1
            ORDER BY f.since DESC
            ",
        )?;

        let rows = stmt
            .query_map(params![&user.as_bytes()[..]], |row| {
                let friend_id: Vec<u8> = row.get(0)?;
                let since: i64 = row.get(1)?;
                Ok((friend_id, since))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(friend_id, since)| {
                Ok(FriendEdge::new(user, UserId::from_slice(&friend_id)?, since))
            })
            .collect()
    }

    /// Returns every request ever made between `a` and `b`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn requests_between(&self, a: UserId, b: UserId) -> Result<Vec<FriendRequest>> {
        let conn = self.lock()?;
        let (low, high) = canonical_pair(a, b);

        let mut stmt = conn.prepare(&format!(
            r"
            SELECT {REQUEST_COLUMNS}
            FROM friend_requests
            WHERE pair_low = ?1 AND pair_high = ?2
            ORDER BY created_at, rowid
            "
        ))?;

        let rows = stmt
            .query_map(
                params![&low.as_bytes()[..], &high.as_bytes()[..]],
                RequestRow::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    /// Writes a single directed friend row without its mirror.
    ///
    /// Exists only so tests can reproduce a corrupted store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn insert_directed_edge_unchecked(&self, owner: UserId, friend: UserId) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO friend_edges (owner_id, friend_id, since) VALUES (?1, ?2, ?3)",
            params![
                &owner.as_bytes()[..],
                &friend.as_bytes()[..],
                chrono::Utc::now().timestamp()
            ],
        )?;
        Ok(())
    }
}

impl RelationshipStore for SqliteRelationshipStore {
    fn is_blocked(&self, blocker_id: UserId, blocked_id: UserId) -> Result<bool> {
        let conn = self.lock()?;
        query_blocked(&conn, blocker_id, blocked_id)
    }

    fn friendship(&self, a: UserId, b: UserId) -> Result<Option<FriendEdge>> {
        let conn = self.lock()?;
        query_friendship(&conn, a, b)
    }

    fn find_pending_request(&self, a: UserId, b: UserId) -> Result<Option<FriendRequest>> {
        let conn = self.lock()?;
        query_pending(&conn, a, b)
    }

    fn get_request(&self, id: RequestId) -> Result<Option<FriendRequest>> {
        let conn = self.lock()?;
        query_request(&conn, id)
    }

    fn pending_requests_for(&self, recipient_id: UserId) -> Result<Vec<FriendRequest>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            r"
            SELECT {REQUEST_COLUMNS}
            FROM friend_requests
            WHERE recipient_id = ?1 AND status = 'pending'
            ORDER BY created_at, rowid
            "
        ))?;

        let rows = stmt
            .query_map(params![&recipient_id.as_bytes()[..]], RequestRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    fn create_request(&self, requester_id: UserId, recipient_id: UserId) -> Result<FriendRequest> {
        if requester_id == recipient_id {
            return Err(StoreError::SelfRelationship);
        }

        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();
        let (low, high) = canonical_pair(requester_id, recipient_id);
        let request = FriendRequest {
            id: RequestId::new(),
            requester_id,
            recipient_id,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r"
            INSERT INTO friend_requests
                (id, requester_id, recipient_id, pair_low, pair_high, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                &request.id.as_bytes()[..],
                &requester_id.as_bytes()[..],
                &recipient_id.as_bytes()[..],
                &low.as_bytes()[..],
                &high.as_bytes()[..],
                request.status.as_str(),
                now,
                now,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicatePendingRequest
            } else {
                StoreError::from(e)
            }
        })?;

        Ok(request)
    }

    fn transition_request(&self, id: RequestId, status: RequestStatus) -> Result<FriendRequest> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let request = update_status(&tx, id, status)?;
        tx.commit()?;
        Ok(request)
    }

    fn create_friend_edge_pair(&self, a: UserId, b: UserId) -> Result<FriendEdge> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let edge = insert_edge_pair(&tx, a, b)?;
        tx.commit()?;
        Ok(edge)
    }

    fn accept_request(&self, id: RequestId, veto_on_block: bool) -> Result<Acceptance> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let request = update_status(&tx, id, RequestStatus::Accepted)?;
        if veto_on_block
            && (query_blocked(&tx, request.requester_id, request.recipient_id)?
                || query_blocked(&tx, request.recipient_id, request.requester_id)?)
        {
            // dropping the transaction rolls the status update back
            return Err(StoreError::Blocked);
        }
        let (edge, created) =
            match insert_edge_pair(&tx, request.requester_id, request.recipient_id) {
                Ok(edge) => (edge, true),
                Err(StoreError::AlreadyFriends) => {
                    let edge = query_friendship(&tx, request.requester_id, request.recipient_id)?
                        .ok_or_else(|| {
                            StoreError::Integrity(format!(
                                "friend edge for {} and {} vanished during acceptance",
                                request.requester_id, request.recipient_id
                            ))
                        })?;
                    (edge, false)
                }
                Err(e) => return Err(e),
            };

        tx.commit()?;

        Ok(Acceptance {
            request,
            edge,
            created,
        })
    }

    fn snapshot(&self, viewer: UserId, subject: UserId) -> Result<RelationshipFacts> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let facts = RelationshipFacts {
            viewer_blocked_by_subject: query_blocked(&tx, subject, viewer)?,
            subject_blocked_by_viewer: query_blocked(&tx, viewer, subject)?,
            friendship: query_friendship(&tx, viewer, subject)?,
            pending_request: query_pending(&tx, viewer, subject)?,
        };

        tx.commit()?;
        Ok(facts)
    }
}

// ==================== Query Helpers ====================

/// Raw request row before ID and status decoding.
struct RequestRow {
    id: Vec<u8>,
    requester_id: Vec<u8>,
    recipient_id: Vec<u8>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl RequestRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            requester_id: row.get(1)?,
            recipient_id: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_request(self) -> Result<FriendRequest> {
        let status = RequestStatus::parse(&self.status)
            .ok_or_else(|| StoreError::InvalidData(format!("Invalid status: {}", self.status)))?;

        Ok(FriendRequest {
            id: RequestId::from_slice(&self.id)?,
            requester_id: UserId::from_slice(&self.requester_id)?,
            recipient_id: UserId::from_slice(&self.recipient_id)?,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    e.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
    )
}

fn query_blocked(conn: &Connection, blocker_id: UserId, blocked_id: UserId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM block_edges WHERE blocker_id = ?1 AND blocked_id = ?2",
            params![&blocker_id.as_bytes()[..], &blocked_id.as_bytes()[..]],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn query_directed_edge(conn: &Connection, owner: UserId, friend: UserId) -> Result<Option<i64>> {
    let since = conn
        .query_row(
            "SELECT since FROM friend_edges WHERE owner_id = ?1 AND friend_id = ?2",
            params![&owner.as_bytes()[..], &friend.as_bytes()[..]],
            |row| row.get(0),
        )
        .optional()?;
    Ok(since)
}

fn query_friendship(conn: &Connection, a: UserId, b: UserId) -> Result<Option<FriendEdge>> {
    let forward = query_directed_edge(conn, a, b)?;
    let backward = query_directed_edge(conn, b, a)?;

    match (forward, backward) {
        (Some(since), Some(mirror_since)) => {
            Ok(Some(FriendEdge::new(a, b, since.min(mirror_since))))
        }
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => {
            tracing::error!(user_a = %a, user_b = %b, "asymmetric friend edge detected");
            Err(StoreError::Integrity(format!(
                "friend edge between {a} and {b} is missing its mirror row"
            )))
        }
    }
}

fn query_pending(conn: &Connection, a: UserId, b: UserId) -> Result<Option<FriendRequest>> {
    let (low, high) = canonical_pair(a, b);

    let row = conn
        .query_row(
            &format!(
                r"
                SELECT {REQUEST_COLUMNS}
                FROM friend_requests
                WHERE pair_low = ?1 AND pair_high = ?2 AND status = 'pending'
                "
            ),
            params![&low.as_bytes()[..], &high.as_bytes()[..]],
            RequestRow::from_row,
        )
        .optional()?;

    row.map(RequestRow::into_request).transpose()
}

fn query_request(conn: &Connection, id: RequestId) -> Result<Option<FriendRequest>> {
    let row = conn
        .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM friend_requests WHERE id = ?1"),
            params![&id.as_bytes()[..]],
            RequestRow::from_row,
        )
        .optional()?;

    row.map(RequestRow::into_request).transpose()
}

fn update_status(conn: &Connection, id: RequestId, status: RequestStatus) -> Result<FriendRequest> {
    let mut request = query_request(conn, id)?
        .ok_or_else(|| StoreError::NotFound(format!("Friend request not found: {id}")))?;

    if !request.status.can_transition_to(status) {
        return Err(StoreError::InvalidTransition {
            from: request.status,
            to: status,
        });
    }

    let now = chrono::Utc::now().timestamp();
    let rows = conn.execute(
        r"
        UPDATE friend_requests
        SET status = ?1, updated_at = ?2
        WHERE id = ?3 AND status = 'pending'
        ",
        params![status.as_str(), now, &id.as_bytes()[..]],
    )?;

    if rows == 0 {
        return Err(StoreError::InvalidTransition {
            from: request.status,
            to: status,
        });
    }

    request.status = status;
    request.updated_at = now;
    Ok(request)
}

fn insert_edge_pair(conn: &Connection, a: UserId, b: UserId) -> Result<FriendEdge> {
    if a == b {
        return Err(StoreError::SelfRelationship);
    }
    if query_friendship(conn, a, b)?.is_some() {
        return Err(StoreError::AlreadyFriends);
    }

    let since = chrono::Utc::now().timestamp();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO friend_edges (owner_id, friend_id, since) VALUES (?1, ?2, ?3)",
    )?;

    for (owner, friend) in [(a, b), (b, a)] {
        stmt.execute(params![&owner.as_bytes()[..], &friend.as_bytes()[..], since])
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyFriends
                } else {
                    StoreError::from(e)
                }
            })?;
    }

    Ok(FriendEdge::new(a, b, since))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> (UserId, UserId) {
        (UserId::new(), UserId::new())
    }

    // ==================== Block Tests ====================

    #[test]
    fn block_is_directed() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.add_block(a, b).unwrap();

        assert!(store.is_blocked(a, b).unwrap());
        assert!(!store.is_blocked(b, a).unwrap());
    }

    #[test]
    fn blocking_twice_keeps_one_edge() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let first = store.add_block(a, b).unwrap();
        let second = store.add_block(a, b).unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(store.remove_block(a, b).unwrap());
        assert!(!store.remove_block(a, b).unwrap());
        assert!(!store.is_blocked(a, b).unwrap());
    }

    #[test]
    fn self_block_rejected() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let a = UserId::new();
        assert!(matches!(
            store.add_block(a, a),
            Err(StoreError::SelfRelationship)
        ));
    }

    // ==================== Friend Edge Tests ====================

    #[test]
    fn friend_edge_pair_is_symmetric() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let edge = store.create_friend_edge_pair(a, b).unwrap();

        assert!(store.are_friends(a, b).unwrap());
        assert!(store.are_friends(b, a).unwrap());
        assert_eq!(store.friendship(b, a).unwrap(), Some(edge));
    }

    #[test]
    fn duplicate_friend_edge_pair_reports_already_friends() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.create_friend_edge_pair(a, b).unwrap();
        assert!(matches!(
            store.create_friend_edge_pair(b, a),
            Err(StoreError::AlreadyFriends)
        ));
    }

    #[test]
    fn one_sided_edge_is_integrity_error() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.insert_directed_edge_unchecked(a, b).unwrap();

        assert!(matches!(
            store.are_friends(a, b),
            Err(StoreError::Integrity(_))
        ));
        assert!(matches!(
            store.are_friends(b, a),
            Err(StoreError::Integrity(_))
        ));
        assert!(matches!(
            store.remove_friend_edge_pair(a, b),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn remove_friend_edge_pair_removes_both_rows() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.create_friend_edge_pair(a, b).unwrap();
        assert!(store.remove_friend_edge_pair(b, a).unwrap());

        assert!(!store.are_friends(a, b).unwrap());
        assert!(!store.are_friends(b, a).unwrap());
        assert!(!store.remove_friend_edge_pair(a, b).unwrap());
    }

    #[test]
    fn friends_of_lists_both_sides() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();
        let c = UserId::new();

        store.create_friend_edge_pair(a, b).unwrap();
        store.create_friend_edge_pair(c, a).unwrap();

        let friends = store.friends_of(a).unwrap();
        assert_eq!(friends.len(), 2);
        assert!(friends.iter().all(|edge| edge.involves(a)));
        assert_eq!(store.friends_of(b).unwrap().len(), 1);
    }

    // ==================== Request Tests ====================

    #[test]
    fn create_and_find_pending_request() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(store.find_pending_request(a, b).unwrap(), Some(request.clone()));
        assert_eq!(store.find_pending_request(b, a).unwrap(), Some(request.clone()));
        assert_eq!(store.get_request(request.id).unwrap(), Some(request));
    }

    #[test]
    fn duplicate_pending_request_same_direction_rejected() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.create_request(a, b).unwrap();
        assert!(matches!(
            store.create_request(a, b),
            Err(StoreError::DuplicatePendingRequest)
        ));
    }

    #[test]
    fn crossing_pending_request_rejected() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        store.create_request(a, b).unwrap();
        assert!(matches!(
            store.create_request(b, a),
            Err(StoreError::DuplicatePendingRequest)
        ));
    }

    #[test]
    fn self_request_rejected() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let a = UserId::new();
        assert!(matches!(
            store.create_request(a, a),
            Err(StoreError::SelfRelationship)
        ));
    }

    #[test]
    fn terminal_request_cannot_transition() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        let rejected = store
            .transition_request(request.id, RequestStatus::Rejected)
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);

        let result = store.transition_request(request.id, RequestStatus::Accepted);
        assert!(matches!(
            result,
            Err(StoreError::InvalidTransition {
                from: RequestStatus::Rejected,
                to: RequestStatus::Accepted
            })
        ));
    }

    #[test]
    fn transition_to_pending_is_invalid() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        assert!(matches!(
            store.transition_request(request.id, RequestStatus::Pending),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn transition_unknown_request_not_found() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        assert!(matches!(
            store.transition_request(RequestId::new(), RequestStatus::Accepted),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn rejected_request_is_superseded_by_new_row() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let first = store.create_request(a, b).unwrap();
        store
            .transition_request(first.id, RequestStatus::Rejected)
            .unwrap();
        let second = store.create_request(b, a).unwrap();

        assert_ne!(first.id, second.id);
        let history = store.requests_between(a, b).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, RequestStatus::Rejected);
        assert_eq!(history[1].status, RequestStatus::Pending);
    }

    #[test]
    fn accept_request_creates_edge_pair() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        let acceptance = store.accept_request(request.id, true).unwrap();

        assert!(acceptance.created);
        assert_eq!(acceptance.request.status, RequestStatus::Accepted);
        assert_eq!(acceptance.edge, FriendEdge::new(a, b, acceptance.edge.since));
        assert!(store.are_friends(b, a).unwrap());
        assert!(store.find_pending_request(a, b).unwrap().is_none());
    }

    #[test]
    fn accept_request_with_existing_edge_is_success() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        let existing = store.create_friend_edge_pair(a, b).unwrap();
        let acceptance = store.accept_request(request.id, true).unwrap();

        assert!(!acceptance.created);
        assert_eq!(acceptance.edge, existing);
        assert_eq!(acceptance.request.status, RequestStatus::Accepted);
    }

    #[test]
    fn accept_twice_is_invalid_transition() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        store.accept_request(request.id, true).unwrap();

        assert!(matches!(
            store.accept_request(request.id, true),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn accept_request_refused_by_block_keeps_request_pending() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        store.add_block(a, b).unwrap();

        assert!(matches!(
            store.accept_request(request.id, true),
            Err(StoreError::Blocked)
        ));
        let still = store.get_request(request.id).unwrap().unwrap();
        assert_eq!(still.status, RequestStatus::Pending);
        assert!(!store.are_friends(a, b).unwrap());

        let acceptance = store.accept_request(request.id, false).unwrap();
        assert!(acceptance.created);
        assert!(store.are_friends(b, a).unwrap());
    }

    #[test]
    fn accept_request_checks_block_from_recipient_side() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();

        let request = store.create_request(a, b).unwrap();
        store.add_block(b, a).unwrap();

        assert!(matches!(
            store.accept_request(request.id, true),
            Err(StoreError::Blocked)
        ));
        assert!(store.find_pending_request(a, b).unwrap().is_some());
    }

    #[test]
    fn pending_requests_for_recipient() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (a, b) = users();
        let c = UserId::new();

        store.create_request(a, b).unwrap();
        store.create_request(c, b).unwrap();
        store.create_request(b, UserId::new()).unwrap();

        let inbox = store.pending_requests_for(b).unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().all(|r| r.recipient_id == b));
    }

    // ==================== Snapshot Tests ====================

    #[test]
    fn snapshot_reads_all_facts() {
        let store = SqliteRelationshipStore::in_memory().unwrap();
        let (viewer, subject) = users();

        store.add_block(subject, viewer).unwrap();
        let request = store.create_request(viewer, subject).unwrap();

        let facts = store.snapshot(viewer, subject).unwrap();
        assert!(facts.viewer_blocked_by_subject);
        assert!(!facts.subject_blocked_by_viewer);
        assert!(facts.any_block());
        assert!(!facts.are_friends());
        assert_eq!(facts.pending_request, Some(request));
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relationships.db");
        let (a, b) = users();

        {
            let store = SqliteRelationshipStore::new(&path, Duration::from_secs(1)).unwrap();
            store.create_friend_edge_pair(a, b).unwrap();
        }

        let store = SqliteRelationshipStore::new(&path, Duration::from_secs(1)).unwrap();
        assert!(store.are_friends(a, b).unwrap());
    }
}
