//! Pooled database handle shared by every repository.

use std::path::Path;

use rusqlite::{Connection, Transaction};
use stockroom_core::DomainError;
use tracing::info;

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::errors::{Result, StoreError};
use crate::migrations;

/// Cloneable handle over a migrated connection pool.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (creating if needed) a database file and apply pending migrations.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?;
        let db = Self::from_pool(connection::new_file(path_str, config)?)?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Fresh in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        Self::from_pool(connection::new_in_memory(&ConnectionConfig::default())?)
    }

    fn from_pool(pool: ConnectionPool) -> Result<Self> {
        let conn = pool.get()?;
        let _ = migrations::run_migrations(&conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    /// Run `f` with a pooled connection, converting errors for the domain layer.
    ///
    /// Do not call back into `Database` from inside `f`: the in-memory pool
    /// holds a single connection.
    pub fn with_conn<T, F>(&self, f: F) -> stockroom_core::Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let run = || -> Result<T> {
            let conn = self.pool.get()?;
            f(&conn)
        };
        run().map_err(DomainError::from)
    }

    /// Run `f` inside a transaction that commits when `f` succeeds.
    pub fn with_tx<T, F>(&self, f: F) -> stockroom_core::Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
    }
}
