//! SQLite-backed LockStore implementation.
//! Keeps the lock table across process restarts so held leases survive a
//! redeploy instead of silently unlocking every object.
//!
//! Enable with the `sqlite` feature flag:
//! ```toml
//! objlock-core = { path = "../objlock-core", features = ["sqlite"] }
//! ```

use parking_lot::Mutex;
use rusqlite::{Connection, params};
use tracing::warn;

use crate::infrastructure::LockStore;
use crate::types::{Lock, ObjectId};

/// A persistent lock store backed by SQLite.
///
/// Uses WAL mode for concurrent read performance. The connection sits behind
/// a mutex so the store can be shared across caller threads.
pub struct SqliteLockStore {
    conn: Mutex<Connection>,
}

impl SqliteLockStore {
    /// Open (or create) a SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        // WAL keeps readers off the writer's back
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS locks (
                object_id   TEXT PRIMARY KEY,
                session     TEXT NOT NULL,
                locker      TEXT NOT NULL,
                version     INTEGER,
                acquired_at INTEGER NOT NULL,
                expires_at  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_locks_expires ON locks(expires_at);
            CREATE INDEX IF NOT EXISTS idx_locks_owner ON locks(session, locker);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_lock(row: &rusqlite::Row) -> rusqlite::Result<Lock> {
        Ok(Lock {
            object_id: ObjectId::new(row.get::<_, String>(0)?),
            session: row.get(1)?,
            locker: row.get(2)?,
            version: row.get(3)?,
            acquired_at: row.get(4)?,
            expires_at: row.get(5)?,
        })
    }
}

impl LockStore for SqliteLockStore {
    fn get(&self, id: &ObjectId) -> Option<Lock> {
        let conn = self.conn.lock();
        match conn.query_row(
            "SELECT object_id, session, locker, version, acquired_at, expires_at
             FROM locks WHERE object_id = ?1",
            params![id.as_str()],
            Self::row_to_lock,
        ) {
            Ok(lock) => Some(lock),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            // A real read failure must not pass silently for "unlocked"
            Err(e) => {
                warn!(object_id = %id, error = %e, "failed to read lock row");
                None
            }
        }
    }

    fn put(&mut self, lock: Lock) {
        let conn = self.conn.lock();
        if let Err(e) = conn.execute(
            "INSERT OR REPLACE INTO locks (object_id, session, locker, version, acquired_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                lock.object_id.as_str(),
                lock.session,
                lock.locker,
                lock.version,
                lock.acquired_at,
                lock.expires_at,
            ],
        ) {
            warn!(object_id = %lock.object_id, error = %e, "failed to persist lock row");
        }
    }

    fn remove(&mut self, id: &ObjectId) -> bool {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM locks WHERE object_id = ?1", params![id.as_str()])
            .unwrap_or(0)
            > 0
    }

    fn scan(&self, predicate: &dyn Fn(&Lock) -> bool) -> Vec<Lock> {
        let conn = self.conn.lock();
        let mut stmt = match conn.prepare(
            "SELECT object_id, session, locker, version, acquired_at, expires_at FROM locks",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!(error = %e, "failed to prepare lock scan");
                return Vec::new();
            }
        };

        match stmt.query_map([], Self::row_to_lock) {
            Ok(rows) => rows
                .filter_map(|r| r.ok())
                .filter(|l| predicate(l))
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to scan lock rows");
                Vec::new()
            }
        }
    }

    fn len(&self) -> usize {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM locks", [], |row| {
            row.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }
}
