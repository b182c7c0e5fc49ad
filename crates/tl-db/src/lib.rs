//! Storage layer for the time ledger.
//!
//! Persists the serialized ledger snapshot using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The ledger is mutated from
//! one thread at a time, so a single connection is enough.
//!
//! # Schema
//!
//! A single key/value table holds whole documents. The ledger lives under
//! [`LEDGER_KEY`] as the JSON produced by [`tl_core::snapshot::encode`].
//! Each save replaces the value in one statement, so readers never observe a
//! partially written snapshot.
//!
//! `updated_at` is stored as TEXT in RFC 3339 UTC (e.g., `2025-05-06T10:30:00Z`).

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, warn};

use tl_core::{Ledger, SnapshotError, snapshot};

/// Key under which the ledger snapshot is stored.
pub const LEDGER_KEY: &str = "taskTrackerData";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A snapshot could not be encoded, or an explicit import could not be decoded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads a raw stored document.
    pub fn get_value(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Writes a raw document, replacing any previous value.
    pub fn put_value(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.conn.execute(
            "
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// When the ledger snapshot was last written, if ever.
    pub fn ledger_saved_at(&self) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?",
                [LEDGER_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Loads the ledger.
    ///
    /// A missing snapshot yields an empty ledger. A corrupt snapshot is logged
    /// and discarded as a whole; the next save overwrites it.
    pub fn load_ledger(&self) -> Result<Ledger, DbError> {
        let Some(raw) = self.get_value(LEDGER_KEY)? else {
            debug!("no stored ledger, starting empty");
            return Ok(Ledger::new());
        };
        match snapshot::decode(&raw) {
            Ok(ledger) => {
                debug!(days = ledger.days().count(), "loaded ledger");
                Ok(ledger)
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable ledger snapshot");
                Ok(Ledger::new())
            }
        }
    }

    /// Persists the whole ledger.
    pub fn save_ledger(&mut self, ledger: &Ledger) -> Result<(), DbError> {
        let json = snapshot::encode(ledger)?;
        self.put_value(LEDGER_KEY, &json)?;
        debug!(bytes = json.len(), "saved ledger");
        Ok(())
    }

    /// Replaces the stored ledger with an externally supplied snapshot.
    ///
    /// Unlike [`Self::load_ledger`], decoding errors are returned, and nothing
    /// is written when the document is rejected.
    pub fn import_snapshot(&mut self, json: &str) -> Result<Ledger, DbError> {
        let ledger = snapshot::decode(json)?;
        self.save_ledger(&ledger)?;
        Ok(ledger)
    }
}
