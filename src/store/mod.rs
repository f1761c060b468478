//! Persistence Layer
//! Mission: SQLite-backed storage with a uniform versioned-update contract
//!
//! Every mutable table carries a `version` column starting at 1. Updates go
//! through [`versioned::conditional_update`] so the compare-and-swap
//! discipline cannot drift between entities.

pub mod comments;
pub mod currencies;
pub mod record_types;
pub mod records;
pub mod users;
pub mod versioned;

use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

pub use records::RecordFilters;

/// Per-call deadline for every database operation. A stalled writer yields
/// [`StoreError::Timeout`] instead of pinning the request task.
const BUSY_TIMEOUT: Duration = Duration::from_secs(3);

/// Domain-level storage errors. Raw rusqlite errors never cross this
/// boundary except wrapped in `Sqlite`, which callers treat as internal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    /// The conditional write matched zero rows: the caller's snapshot is
    /// stale, or the row is gone. Recoverable by re-read and retry.
    #[error("edit conflict")]
    EditConflict,
    /// Uniqueness violation on the named column.
    #[error("duplicate value for {0}")]
    Duplicate(String),
    #[error("referenced row not found")]
    ForeignKey,
    #[error("database deadline exceeded")]
    Timeout,
    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
            return StoreError::NotFound;
        }

        if let rusqlite::Error::SqliteFailure(e, ref msg) = err {
            match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::Duplicate(duplicate_column(msg.as_deref()));
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return StoreError::ForeignKey,
                _ => {}
            }
            if e.code == rusqlite::ErrorCode::DatabaseBusy {
                return StoreError::Timeout;
            }
        }

        StoreError::Sqlite(err)
    }
}

/// Pulls the column name out of a message like
/// `UNIQUE constraint failed: users.email`.
fn duplicate_column(msg: Option<&str>) -> String {
    msg.and_then(|m| m.rsplit('.').next())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "value".to_string())
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        activated INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS currencies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        rate REAL NOT NULL,
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS record_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount INTEGER NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        type_id INTEGER NOT NULL REFERENCES record_types(id),
        currency_id INTEGER NOT NULL REFERENCES currencies(id),
        user_id INTEGER NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1
    );
";

/// SQLite-backed store. Connections are opened per operation with a busy
/// timeout and dropped on every exit path.
pub struct Store {
    db_path: String,
}

impl Store {
    /// Open the store and initialize the schema. Failure here is fatal and
    /// surfaces at startup, not at first request.
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        let conn = store.conn()?;
        conn.execute_batch(SCHEMA)?;
        info!("database schema ready at {}", db_path);
        Ok(store)
    }

    pub(crate) fn conn(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }
}
