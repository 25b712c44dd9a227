pub mod feedback;
pub mod migrations;
pub mod models;
pub mod skills;
pub mod stats;
pub mod swaps;
pub mod tokens;
pub mod users;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

/// Errors surfaced by the data layer. Callers map these onto the HTTP
/// taxonomy, so NotFound/Conflict/Forbidden must stay distinguishable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("database lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut conn)
    }
}

/// Current time in the format stored in TEXT timestamp columns.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use uuid::Uuid;

    use crate::Database;

    /// Insert a user whose email is `<username>@example.com`; returns the id.
    pub fn mk_user(db: &Database, username: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_user(
            &id,
            username,
            &format!("{username}@example.com"),
            username,
            "argon2-hash-placeholder",
        )
        .unwrap();
        id
    }

    pub fn mk_skill(db: &Database, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_skill(&id, name).unwrap();
        id
    }

    /// Insert a pending swap request; returns the id.
    pub fn mk_swap(
        db: &Database,
        sender: &str,
        receiver: &str,
        offered: &str,
        requested: &str,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_swap(&id, sender, receiver, offered, requested)
            .unwrap();
        id
    }
}

/// The message of a UNIQUE/CHECK violation, if this is one. SQLite names the
/// offending column(s) in the message, e.g. "UNIQUE constraint failed:
/// users.email", which callers use to pick the right field error.
pub(crate) fn constraint_message(e: &rusqlite::Error) -> Option<String> {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(msg.clone().unwrap_or_else(|| "constraint violation".into()))
        }
        _ => None,
    }
}
