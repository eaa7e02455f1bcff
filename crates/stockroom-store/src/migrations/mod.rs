//! Schema migration runner.
//!
//! Migrations are embedded at compile time via [`include_str!`] and executed
//! in version order, each inside its own transaction. The `schema_version`
//! table tracks what has been applied, so running the migrator is idempotent.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Inventory schema: workspaces and all workspace-scoped tables",
    sql: include_str!("v001_schema.sql"),
}];

fn migration_error(message: String) -> StoreError {
    StoreError::Migration { message }
}

/// Run all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current {
            debug!(version = migration.version, "migration already applied, skipping");
            continue;
        }
        info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        apply_migration(conn, migration)?;
        applied += 1;
    }

    if applied > 0 {
        info!(applied, "migrations complete");
    }
    Ok(applied)
}

/// Highest applied migration version, or 0 if none.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_error(format!("failed to read schema_version: {e}")))
}

/// Latest migration version defined in code.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| migration_error(format!("failed to create schema_version table: {e}")))
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(|e| {
        migration_error(format!(
            "failed to begin transaction for v{}: {e}",
            migration.version
        ))
    })?;

    tx.execute_batch(migration.sql).map_err(|e| {
        migration_error(format!(
            "migration v{} ({}) failed: {e}",
            migration.version, migration.description
        ))
    })?;

    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES (?1, datetime('now'), ?2)",
            rusqlite::params![migration.version, migration.description],
        )
        .map_err(|e| {
            migration_error(format!(
                "failed to record v{} in schema_version: {e}",
                migration.version
            ))
        })?;

    tx.commit()
        .map_err(|e| migration_error(format!("failed to commit v{}: {e}", migration.version)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn creates_all_tables() {
        let conn = open_memory();
        assert_eq!(run_migrations(&conn).unwrap(), 1);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(std::result::Result::ok)
            .collect();

        for table in [
            "attachments",
            "borrowers",
            "categories",
            "containers",
            "files",
            "inventory",
            "item_labels",
            "items",
            "labels",
            "loans",
            "locations",
            "movements",
            "schema_version",
            "workspaces",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table: {table}");
        }
    }

    #[test]
    fn is_idempotent() {
        let conn = open_memory();
        assert_eq!(run_migrations(&conn).unwrap(), 1);
        assert_eq!(run_migrations(&conn).unwrap(), 0);
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn one_primary_attachment_per_item_is_enforced() {
        let conn = open_memory();
        let _ = run_migrations(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO workspaces VALUES ('ws', 'W', 'w', NULL, 't', 't');
             INSERT INTO items (id, workspace_id, name, sku, created_at, updated_at)
                 VALUES ('it', 'ws', 'Item', 'SKU', 't', 't');
             INSERT INTO attachments (id, workspace_id, item_id, external_ref, attachment_type,
                                      is_primary, created_at, updated_at)
                 VALUES ('a1', 'ws', 'it', 'x', 'PHOTO', 1, 't', 't');",
        )
        .unwrap();
        let second = conn.execute_batch(
            "INSERT INTO attachments (id, workspace_id, item_id, external_ref, attachment_type,
                                      is_primary, created_at, updated_at)
                 VALUES ('a2', 'ws', 'it', 'y', 'PHOTO', 1, 't', 't');",
        );
        assert!(second.is_err());
    }
}
