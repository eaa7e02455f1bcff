//! `categories` table.

use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::category::{Category, CategoryRepository};
use stockroom_core::{CategoryId, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::{get_id, get_opt_id};

const COLUMNS: &str =
    "id, workspace_id, name, parent_category_id, description, created_at, updated_at";

/// `SQLite` implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct SqliteCategoryRepository {
    db: Database,
}

impl SqliteCategoryRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            parent_category_id: get_opt_id(row, 3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl CategoryRepository for SqliteCategoryRepository {
    fn save(&self, category: &Category) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO categories (id, workspace_id, name, parent_category_id, description,
                                         created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     parent_category_id = excluded.parent_category_id,
                     description = excluded.description,
                     updated_at = excluded.updated_at
                 WHERE categories.workspace_id = excluded.workspace_id",
                params![
                    category.id.as_str(),
                    category.workspace_id.as_str(),
                    category.name,
                    category.parent_category_id.as_ref().map(CategoryId::as_str),
                    category.description,
                    category.created_at,
                    category.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(
        &self,
        workspace_id: &WorkspaceId,
        id: &CategoryId,
    ) -> stockroom_core::Result<Option<Category>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM categories WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<Category>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM categories WHERE workspace_id = ?1 ORDER BY name"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn has_children(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM categories
                               WHERE workspace_id = ?1 AND parent_category_id = ?2)",
                params![workspace_id.as_str(), id.as_str()],
                |row| row.get(0),
            )?)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM categories WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, other_workspace};
    use stockroom_core::category::CreateCategory;

    fn category(ws: &WorkspaceId, name: &str, parent: Option<&Category>) -> Category {
        Category::new(
            ws.clone(),
            &CreateCategory {
                name: name.into(),
                parent_category_id: parent.map(|p| p.id.clone()),
                description: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn children_and_scoping() {
        let (db, ws) = fixture();
        let repo = SqliteCategoryRepository::new(db.clone());
        let tools = category(&ws, "Tools", None);
        let drills = category(&ws, "Drills", Some(&tools));
        repo.save(&tools).unwrap();
        repo.save(&drills).unwrap();

        assert!(repo.has_children(&ws, &tools.id).unwrap());
        assert!(!repo.has_children(&ws, &drills.id).unwrap());
        let names: Vec<_> = repo
            .find_by_workspace(&ws)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Drills", "Tools"]);

        let other = other_workspace(&db);
        assert!(repo.find_by_id(&other, &tools.id).unwrap().is_none());
        assert!(!repo.delete(&other, &tools.id).unwrap());
    }

    #[test]
    fn deleting_category_clears_item_reference() {
        use crate::repositories::SqliteItemRepository;
        use stockroom_core::item::{CreateItem, Item, ItemRepository};

        let (db, ws) = fixture();
        let repo = SqliteCategoryRepository::new(db.clone());
        let items = SqliteItemRepository::new(db);
        let tools = category(&ws, "Tools", None);
        repo.save(&tools).unwrap();
        let item = Item::new(
            ws.clone(),
            &CreateItem {
                name: "Saw".into(),
                sku: "SAW".into(),
                category_id: Some(tools.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();
        items.save(&item).unwrap();

        assert!(repo.delete(&ws, &tools.id).unwrap());
        let reloaded = items.find_by_id(&ws, &item.id).unwrap().unwrap();
        assert!(reloaded.category_id.is_none());
    }
}
