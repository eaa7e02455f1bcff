//! `movements` table. Rows are only ever inserted.

use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::movement::{Movement, MovementRepository};
use stockroom_core::{ContainerId, InventoryId, LocationId, MovementId, Page, PageRequest, WorkspaceId};

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::{count, get_id, get_opt_id};

const COLUMNS: &str = "id, workspace_id, inventory_id, from_location_id, from_container_id, \
                       to_location_id, to_container_id, quantity, moved_by, reason, created_at";

/// Append one movement on an open connection.
pub(crate) fn insert(conn: &Connection, movement: &Movement) -> Result<()> {
    let _ = conn.execute(
        "INSERT INTO movements (id, workspace_id, inventory_id, from_location_id,
                                from_container_id, to_location_id, to_container_id, quantity,
                                moved_by, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            movement.id.as_str(),
            movement.workspace_id.as_str(),
            movement.inventory_id.as_str(),
            movement.from_location_id.as_ref().map(LocationId::as_str),
            movement.from_container_id.as_ref().map(ContainerId::as_str),
            movement.to_location_id.as_ref().map(LocationId::as_str),
            movement.to_container_id.as_ref().map(ContainerId::as_str),
            movement.quantity,
            movement.moved_by,
            movement.reason,
            movement.created_at,
        ],
    )?;
    Ok(())
}

/// `SQLite` implementation of [`MovementRepository`].
#[derive(Clone)]
pub struct SqliteMovementRepository {
    db: Database,
}

impl SqliteMovementRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Movement> {
        Ok(Movement {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            inventory_id: get_id(row, 2)?,
            from_location_id: get_opt_id(row, 3)?,
            from_container_id: get_opt_id(row, 4)?,
            to_location_id: get_opt_id(row, 5)?,
            to_container_id: get_opt_id(row, 6)?,
            quantity: row.get(7)?,
            moved_by: row.get(8)?,
            reason: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

impl MovementRepository for SqliteMovementRepository {
    fn save(&self, movement: &Movement) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| insert(conn, movement))
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &MovementId) -> stockroom_core::Result<Option<Movement>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM movements WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn list(&self, workspace_id: &WorkspaceId, page: PageRequest) -> stockroom_core::Result<Page<Movement>> {
        self.db.with_conn(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM movements WHERE workspace_id = ?1",
                params![workspace_id.as_str()],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM movements WHERE workspace_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let items = stmt
                .query_map(
                    params![workspace_id.as_str(), page.limit, page.offset],
                    Self::map_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Page::new(items, count(total), page))
        })
    }

    fn find_by_inventory(
        &self,
        workspace_id: &WorkspaceId,
        inventory_id: &InventoryId,
    ) -> stockroom_core::Result<Vec<Movement>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM movements WHERE workspace_id = ?1 AND inventory_id = ?2
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str(), inventory_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
