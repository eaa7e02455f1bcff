//! Error types for the store.
//!
//! [`StoreError`] never crosses the crate boundary as-is: repositories return
//! [`DomainError`], produced by the `From` impl below, so that constraint
//! violations surface as conflicts or validation failures instead of 500s.

use rusqlite::ffi;
use stockroom_core::DomainError;
use thiserror::Error;

/// Errors raised by the `SQLite` layer and the filesystem blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// Database path is not valid UTF-8.
    #[error("invalid database path: {0}")]
    InvalidPath(String),

    /// Invalid blob storage key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Convenience alias for store-internal results.
pub type Result<T> = std::result::Result<T, StoreError>;

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        if let StoreError::Sqlite(ref sqlite) = err {
            match constraint_code(sqlite) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                    return DomainError::conflict(format!("duplicate value: {sqlite}"));
                }
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                    return DomainError::validation(
                        "reference",
                        "referenced entity does not exist in this workspace",
                    );
                }
                _ => {}
            }
        }
        DomainError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rusqlite::Connection;

    fn violation(sql: &str) -> DomainError {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id TEXT PRIMARY KEY, name TEXT UNIQUE);
             CREATE TABLE child (id TEXT PRIMARY KEY, parent_id TEXT REFERENCES parent(id));
             INSERT INTO parent VALUES ('p1', 'one');",
        )
        .unwrap();
        let err = conn.execute_batch(sql).unwrap_err();
        StoreError::from(err).into()
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = violation("INSERT INTO parent VALUES ('p2', 'one');");
        assert_matches!(err, DomainError::Conflict(_));
    }

    #[test]
    fn primary_key_violation_is_conflict() {
        let err = violation("INSERT INTO parent VALUES ('p1', 'two');");
        assert_matches!(err, DomainError::Conflict(_));
    }

    #[test]
    fn foreign_key_violation_is_validation() {
        let err = violation("INSERT INTO child VALUES ('c1', 'missing');");
        assert_matches!(err, DomainError::Validation { ref field, .. } if field == "reference");
    }

    #[test]
    fn other_errors_are_storage() {
        let err: DomainError = StoreError::Migration {
            message: "boom".into(),
        }
        .into();
        assert_matches!(err, DomainError::Storage(msg) if msg.contains("boom"));
    }
}
