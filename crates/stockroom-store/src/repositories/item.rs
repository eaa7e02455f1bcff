//! `items` table, including the paged search and the low-stock report.

use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::item::{Item, ItemFilter, ItemRepository, LowStockItem};
use stockroom_core::{CategoryId, ItemId, Page, PageRequest, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::{contains_pattern, count, get_id, get_opt_id};

const COLUMNS: &str = "i.id, i.workspace_id, i.name, i.sku, i.description, i.category_id, \
                       i.brand, i.model, i.manufacturer, i.serial_number, i.barcode, \
                       i.is_insured, i.lifetime_warranty, i.warranty_details, \
                       i.min_stock_level, i.short_code, i.is_archived, i.created_at, i.updated_at";

// ?1 workspace, ?2 search pattern, ?3 category, ?4 include archived.
const LIST_FILTER: &str = "i.workspace_id = ?1
    AND (?2 IS NULL OR i.name LIKE ?2 ESCAPE '\\' OR i.sku LIKE ?2 ESCAPE '\\'
         OR i.brand LIKE ?2 ESCAPE '\\')
    AND (?3 IS NULL OR i.category_id = ?3)
    AND (?4 OR i.is_archived = 0)";

/// `SQLite` implementation of [`ItemRepository`].
#[derive(Clone)]
pub struct SqliteItemRepository {
    db: Database,
}

impl SqliteItemRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            sku: row.get(3)?,
            description: row.get(4)?,
            category_id: get_opt_id(row, 5)?,
            brand: row.get(6)?,
            model: row.get(7)?,
            manufacturer: row.get(8)?,
            serial_number: row.get(9)?,
            barcode: row.get(10)?,
            is_insured: row.get(11)?,
            lifetime_warranty: row.get(12)?,
            warranty_details: row.get(13)?,
            min_stock_level: row.get(14)?,
            short_code: row.get(15)?,
            is_archived: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }

    fn find_one(
        &self,
        filter: &str,
        workspace_id: &WorkspaceId,
        value: &str,
    ) -> stockroom_core::Result<Option<Item>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM items i WHERE i.workspace_id = ?1 AND {filter}"),
                    params![workspace_id.as_str(), value],
                    Self::map_row,
                )
                .optional()?)
        })
    }
}

impl ItemRepository for SqliteItemRepository {
    fn save(&self, item: &Item) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO items (id, workspace_id, name, sku, description, category_id, brand,
                                    model, manufacturer, serial_number, barcode, is_insured,
                                    lifetime_warranty, warranty_details, min_stock_level,
                                    short_code, is_archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                         ?17, ?18, ?19)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     sku = excluded.sku,
                     description = excluded.description,
                     category_id = excluded.category_id,
                     brand = excluded.brand,
                     model = excluded.model,
                     manufacturer = excluded.manufacturer,
                     serial_number = excluded.serial_number,
                     barcode = excluded.barcode,
                     is_insured = excluded.is_insured,
                     lifetime_warranty = excluded.lifetime_warranty,
                     warranty_details = excluded.warranty_details,
                     min_stock_level = excluded.min_stock_level,
                     short_code = excluded.short_code,
                     is_archived = excluded.is_archived,
                     updated_at = excluded.updated_at
                 WHERE items.workspace_id = excluded.workspace_id",
                params![
                    item.id.as_str(),
                    item.workspace_id.as_str(),
                    item.name,
                    item.sku,
                    item.description,
                    item.category_id.as_ref().map(CategoryId::as_str),
                    item.brand,
                    item.model,
                    item.manufacturer,
                    item.serial_number,
                    item.barcode,
                    item.is_insured,
                    item.lifetime_warranty,
                    item.warranty_details,
                    item.min_stock_level,
                    item.short_code,
                    item.is_archived,
                    item.created_at,
                    item.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &ItemId) -> stockroom_core::Result<Option<Item>> {
        self.find_one("i.id = ?2", workspace_id, id.as_str())
    }

    fn find_by_sku(&self, workspace_id: &WorkspaceId, sku: &str) -> stockroom_core::Result<Option<Item>> {
        self.find_one("i.sku = ?2", workspace_id, sku)
    }

    fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> stockroom_core::Result<Page<Item>> {
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(contains_pattern);
        let category = filter.category_id.as_ref().map(CategoryId::as_str);

        self.db.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM items i WHERE {LIST_FILTER}"),
                params![workspace_id.as_str(), pattern, category, filter.include_archived],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM items i WHERE {LIST_FILTER}
                 ORDER BY i.name, i.id LIMIT ?5 OFFSET ?6"
            ))?;
            let items = stmt
                .query_map(
                    params![
                        workspace_id.as_str(),
                        pattern,
                        category,
                        filter.include_archived,
                        page.limit,
                        page.offset,
                    ],
                    Self::map_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Page::new(items, count(total), page))
        })
    }

    fn low_stock(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<LowStockItem>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS}, COALESCE(SUM(inv.quantity), 0) AS total_quantity
                 FROM items i
                 LEFT JOIN inventory inv ON inv.item_id = i.id AND inv.is_archived = 0
                 WHERE i.workspace_id = ?1 AND i.is_archived = 0
                 GROUP BY i.id
                 HAVING total_quantity < i.min_stock_level
                 ORDER BY i.name, i.id"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], |row| {
                    Ok(LowStockItem {
                        item: Self::map_row(row)?,
                        total_quantity: row.get(19)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &ItemId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM items WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}
