//! `inventory` table.

use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::inventory::{Inventory, InventoryFilter, InventoryRepository};
use stockroom_core::movement::Movement;
use stockroom_core::{ContainerId, InventoryId, ItemId, LocationId, WorkspaceId};

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::{get_enum, get_id, get_opt_id};

use super::movement;

const COLUMNS: &str = "id, workspace_id, item_id, location_id, container_id, quantity, \
                       condition, status, date_acquired, purchase_price, currency_code, \
                       warranty_expires, expiration_date, notes, is_archived, created_at, \
                       updated_at";

/// `SQLite` implementation of [`InventoryRepository`].
#[derive(Clone)]
pub struct SqliteInventoryRepository {
    db: Database,
}

/// Insert or update one record on an open connection.
fn upsert(conn: &Connection, inventory: &Inventory) -> Result<()> {
    let _ = conn.execute(
        "INSERT INTO inventory (id, workspace_id, item_id, location_id, container_id, quantity,
                                condition, status, date_acquired, purchase_price, currency_code,
                                warranty_expires, expiration_date, notes, is_archived,
                                created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
         ON CONFLICT(id) DO UPDATE SET
             location_id = excluded.location_id,
             container_id = excluded.container_id,
             quantity = excluded.quantity,
             condition = excluded.condition,
             status = excluded.status,
             date_acquired = excluded.date_acquired,
             purchase_price = excluded.purchase_price,
             currency_code = excluded.currency_code,
             warranty_expires = excluded.warranty_expires,
             expiration_date = excluded.expiration_date,
             notes = excluded.notes,
             is_archived = excluded.is_archived,
             updated_at = excluded.updated_at
         WHERE inventory.workspace_id = excluded.workspace_id",
        params![
            inventory.id.as_str(),
            inventory.workspace_id.as_str(),
            inventory.item_id.as_str(),
            inventory.location_id.as_str(),
            inventory.container_id.as_ref().map(ContainerId::as_str),
            inventory.quantity,
            inventory.condition.as_str(),
            inventory.status.as_str(),
            inventory.date_acquired,
            inventory.purchase_price,
            inventory.currency_code,
            inventory.warranty_expires,
            inventory.expiration_date,
            inventory.notes,
            inventory.is_archived,
            inventory.created_at,
            inventory.updated_at,
        ],
    )?;
    Ok(())
}

impl SqliteInventoryRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Inventory> {
        Ok(Inventory {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            item_id: get_id(row, 2)?,
            location_id: get_id(row, 3)?,
            container_id: get_opt_id(row, 4)?,
            quantity: row.get(5)?,
            condition: get_enum(row, 6)?,
            status: get_enum(row, 7)?,
            date_acquired: row.get(8)?,
            purchase_price: row.get(9)?,
            currency_code: row.get(10)?,
            warranty_expires: row.get(11)?,
            expiration_date: row.get(12)?,
            notes: row.get(13)?,
            is_archived: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }
}

impl InventoryRepository for SqliteInventoryRepository {
    fn save(&self, inventory: &Inventory) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| upsert(conn, inventory))
    }

    fn save_with_movement(&self, inventory: &Inventory, movement: &Movement) -> stockroom_core::Result<()> {
        self.db.with_tx(|tx| {
            upsert(tx, inventory)?;
            movement::insert(tx, movement)
        })
    }

    fn find_by_id(
        &self,
        workspace_id: &WorkspaceId,
        id: &InventoryId,
    ) -> stockroom_core::Result<Option<Inventory>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM inventory WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn list(&self, workspace_id: &WorkspaceId, filter: &InventoryFilter) -> stockroom_core::Result<Vec<Inventory>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM inventory
                 WHERE workspace_id = ?1
                   AND (?2 IS NULL OR item_id = ?2)
                   AND (?3 IS NULL OR location_id = ?3)
                   AND (?4 IS NULL OR container_id = ?4)
                   AND (?5 OR is_archived = 0)
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map(
                    params![
                        workspace_id.as_str(),
                        filter.item_id.as_ref().map(ItemId::as_str),
                        filter.location_id.as_ref().map(LocationId::as_str),
                        filter.container_id.as_ref().map(ContainerId::as_str),
                        filter.include_archived,
                    ],
                    Self::map_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &InventoryId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM inventory WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}
