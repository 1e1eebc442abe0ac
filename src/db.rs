//! SQLite persistence for account records.
//!
//! Uniqueness of username, email, and LeetCode handle is enforced by UNIQUE
//! constraints, not by read-then-check: a racing duplicate insert loses at
//! the constraint, and [`unique_violation`] tells the caller which field
//! collided.

use rusqlite::Connection;

mod accounts;
mod schema;

pub type DbResult<T> = Result<T, rusqlite::Error>;

/// Handle to the account store. Connections are opened per operation, the
/// way a single-request-per-call service uses them.
pub struct Store {
    path: String,
}

impl Store {
    pub fn open(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn connect(&self) -> DbResult<Connection> {
        Connection::open(&self.path)
    }

    pub fn initialize(&self) -> DbResult<()> {
        log::debug!("[initialize] creating accounts table...");
        self.connect()?.execute(schema::ACCOUNTS_SCHEMA, [])?;
        Ok(())
    }
}

/// If `err` is a UNIQUE-constraint failure, returns the qualified column
/// that collided (e.g. `accounts.email`).
pub fn unique_violation(err: &rusqlite::Error) -> Option<String> {
    if let rusqlite::Error::SqliteFailure(cause, Some(message)) = err {
        if cause.code == rusqlite::ErrorCode::ConstraintViolation {
            if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
                return Some(column.to_string());
            }
        }
    }
    None
}
