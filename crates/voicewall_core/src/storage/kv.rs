//! Key-value store seam and its backends.
//!
//! # Responsibility
//! - Model the browser-local storage contract: string keys, string values,
//!   whole-value overwrite.
//! - Provide the SQLite backend plus an in-memory fake for tests.
//!
//! # Invariants
//! - `put` overwrites atomically at storage-API granularity; there is no
//!   partial write to observe.
//! - The SQLite backend only accepts migrated connections.

use crate::db::{self, DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// Keyed string storage, the persistence contract of the whole crate.
pub trait KvStore {
    fn get(&self, key: &str) -> DbResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> DbResult<()>;
    fn remove(&mut self, key: &str) -> DbResult<()>;
}

/// SQLite-backed key-value store.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) the backing file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: db::open_db(path)?,
        })
    }

    /// Opens an in-memory store, mainly for tests and the smoke binary.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: db::open_db_in_memory()?,
        })
    }

    /// Wraps an externally opened connection.
    ///
    /// Rejects connections that skipped `db::open_db` bootstrap.
    pub fn from_connection(conn: Connection) -> DbResult<Self> {
        let actual = db::migrations::current_user_version(&conn)?;
        let expected = db::migrations::latest_version();
        if actual < expected {
            return Err(DbError::UninitializedConnection {
                expected_version: expected,
                actual_version: actual,
            });
        }
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// In-memory key-value store for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> DbResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DbResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
