//! `labels` and `item_labels` tables.

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::label::{Label, LabelRepository};
use stockroom_core::{ItemId, LabelId, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::get_id;

const COLUMNS: &str = "l.id, l.workspace_id, l.name, l.color, l.description, l.created_at, l.updated_at";

/// `SQLite` implementation of [`LabelRepository`].
#[derive(Clone)]
pub struct SqliteLabelRepository {
    db: Database,
}

impl SqliteLabelRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Label> {
        Ok(Label {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            color: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn select(&self, sql_tail: &str, workspace_id: &WorkspaceId, value: &str) -> stockroom_core::Result<Vec<Label>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM labels l {sql_tail}"))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str(), value], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

impl LabelRepository for SqliteLabelRepository {
    fn save(&self, label: &Label) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO labels (id, workspace_id, name, color, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     color = excluded.color,
                     description = excluded.description,
                     updated_at = excluded.updated_at
                 WHERE labels.workspace_id = excluded.workspace_id",
                params![
                    label.id.as_str(),
                    label.workspace_id.as_str(),
                    label.name,
                    label.color,
                    label.description,
                    label.created_at,
                    label.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &LabelId) -> stockroom_core::Result<Option<Label>> {
        Ok(self
            .select("WHERE l.workspace_id = ?1 AND l.id = ?2", workspace_id, id.as_str())?
            .into_iter()
            .next())
    }

    fn find_by_name(&self, workspace_id: &WorkspaceId, name: &str) -> stockroom_core::Result<Option<Label>> {
        Ok(self
            .select(
                "WHERE l.workspace_id = ?1 AND l.name = ?2 COLLATE NOCASE",
                workspace_id,
                name.trim(),
            )?
            .into_iter()
            .next())
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<Label>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM labels l WHERE l.workspace_id = ?1 ORDER BY l.name COLLATE NOCASE"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn find_by_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> stockroom_core::Result<Vec<Label>> {
        self.select(
            "JOIN item_labels il ON il.label_id = l.id
             WHERE l.workspace_id = ?1 AND il.item_id = ?2
             ORDER BY l.name COLLATE NOCASE",
            workspace_id,
            item_id.as_str(),
        )
    }

    fn attach(&self, workspace_id: &WorkspaceId, item_id: &ItemId, label_id: &LabelId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO item_labels (item_id, label_id, created_at)
                 SELECT ?2, ?3, ?4
                 WHERE EXISTS (SELECT 1 FROM items WHERE workspace_id = ?1 AND id = ?2)
                   AND EXISTS (SELECT 1 FROM labels WHERE workspace_id = ?1 AND id = ?3)",
                params![workspace_id.as_str(), item_id.as_str(), label_id.as_str(), Utc::now()],
            )?;
            Ok(changed > 0)
        })
    }

    fn detach(&self, workspace_id: &WorkspaceId, item_id: &ItemId, label_id: &LabelId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM item_labels
                 WHERE item_id = ?2 AND label_id = ?3
                   AND label_id IN (SELECT id FROM labels WHERE workspace_id = ?1)",
                params![workspace_id.as_str(), item_id.as_str(), label_id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &LabelId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM labels WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, item, other_workspace};
    use assert_matches::assert_matches;
    use stockroom_core::DomainError;
    use stockroom_core::label::CreateLabel;

    fn label(ws: &WorkspaceId, name: &str) -> Label {
        Label::new(
            ws.clone(),
            &CreateLabel {
                name: name.into(),
                color: Some("#ff0000".into()),
                description: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let (db, ws) = fixture();
        let repo = SqliteLabelRepository::new(db);
        let fragile = label(&ws, "Fragile");
        repo.save(&fragile).unwrap();

        assert_eq!(repo.find_by_name(&ws, "FRAGILE").unwrap(), Some(fragile));
        assert_matches!(repo.save(&label(&ws, "fragile")), Err(DomainError::Conflict(_)));
    }

    #[test]
    fn attach_is_idempotent_and_scoped() {
        let (db, ws) = fixture();
        let repo = SqliteLabelRepository::new(db.clone());
        let drill = item(&db, &ws, "DRL", 0);
        let fragile = label(&ws, "Fragile");
        let heavy = label(&ws, "Heavy");
        repo.save(&fragile).unwrap();
        repo.save(&heavy).unwrap();

        assert!(repo.attach(&ws, &drill.id, &heavy.id).unwrap());
        assert!(repo.attach(&ws, &drill.id, &fragile.id).unwrap());
        assert!(!repo.attach(&ws, &drill.id, &fragile.id).unwrap());
        let names: Vec<_> = repo
            .find_by_item(&ws, &drill.id)
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["Fragile", "Heavy"]);

        let other = other_workspace(&db);
        assert!(!repo.detach(&other, &drill.id, &fragile.id).unwrap());
        assert!(repo.detach(&ws, &drill.id, &fragile.id).unwrap());
        assert!(!repo.detach(&ws, &drill.id, &fragile.id).unwrap());
    }

    #[test]
    fn delete_removes_links() {
        let (db, ws) = fixture();
        let repo = SqliteLabelRepository::new(db.clone());
        let drill = item(&db, &ws, "DRL", 0);
        let fragile = label(&ws, "Fragile");
        repo.save(&fragile).unwrap();
        let _ = repo.attach(&ws, &drill.id, &fragile.id).unwrap();

        assert!(repo.delete(&ws, &fragile.id).unwrap());
        assert!(repo.find_by_item(&ws, &drill.id).unwrap().is_empty());
    }
}
