//! `locations` table.

use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::location::{Location, LocationRepository, LocationUsage};
use stockroom_core::{LocationId, WorkspaceId};

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::{count, get_id, get_opt_id};

const COLUMNS: &str = "id, workspace_id, name, parent_location_id, zone, shelf, bin, \
                       description, short_code, created_at, updated_at";

/// `SQLite` implementation of [`LocationRepository`].
#[derive(Clone)]
pub struct SqliteLocationRepository {
    db: Database,
}

impl SqliteLocationRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Location> {
        Ok(Location {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            parent_location_id: get_opt_id(row, 3)?,
            zone: row.get(4)?,
            shelf: row.get(5)?,
            bin: row.get(6)?,
            description: row.get(7)?,
            short_code: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn count_where(conn: &Connection, sql: &str, ws: &WorkspaceId, id: &LocationId) -> Result<u64> {
        let n: i64 = conn.query_row(sql, params![ws.as_str(), id.as_str()], |row| row.get(0))?;
        Ok(count(n))
    }
}

impl LocationRepository for SqliteLocationRepository {
    fn save(&self, location: &Location) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO locations (id, workspace_id, name, parent_location_id, zone, shelf,
                                        bin, description, short_code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     parent_location_id = excluded.parent_location_id,
                     zone = excluded.zone,
                     shelf = excluded.shelf,
                     bin = excluded.bin,
                     description = excluded.description,
                     short_code = excluded.short_code,
                     updated_at = excluded.updated_at
                 WHERE locations.workspace_id = excluded.workspace_id",
                params![
                    location.id.as_str(),
                    location.workspace_id.as_str(),
                    location.name,
                    location.parent_location_id.as_ref().map(LocationId::as_str),
                    location.zone,
                    location.shelf,
                    location.bin,
                    location.description,
                    location.short_code,
                    location.created_at,
                    location.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(
        &self,
        workspace_id: &WorkspaceId,
        id: &LocationId,
    ) -> stockroom_core::Result<Option<Location>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM locations WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_short_code(
        &self,
        workspace_id: &WorkspaceId,
        short_code: &str,
    ) -> stockroom_core::Result<Option<Location>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {COLUMNS} FROM locations WHERE workspace_id = ?1 AND short_code = ?2"
                    ),
                    params![workspace_id.as_str(), short_code],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<Location>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM locations WHERE workspace_id = ?1 ORDER BY name"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn usage(&self, workspace_id: &WorkspaceId, id: &LocationId) -> stockroom_core::Result<LocationUsage> {
        self.db.with_conn(|conn| {
            Ok(LocationUsage {
                children: Self::count_where(
                    conn,
                    "SELECT COUNT(*) FROM locations WHERE workspace_id = ?1 AND parent_location_id = ?2",
                    workspace_id,
                    id,
                )?,
                containers: Self::count_where(
                    conn,
                    "SELECT COUNT(*) FROM containers WHERE workspace_id = ?1 AND location_id = ?2",
                    workspace_id,
                    id,
                )?,
                inventory: Self::count_where(
                    conn,
                    "SELECT COUNT(*) FROM inventory WHERE workspace_id = ?1 AND location_id = ?2",
                    workspace_id,
                    id,
                )?,
            })
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &LocationId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM locations WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}
