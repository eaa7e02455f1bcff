//! `attachments` table. The partial unique index `idx_attachments_primary`
//! backs the one-primary-per-item rule; writes clear the old primary first.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::attachment::{Attachment, AttachmentRepository};
use stockroom_core::{AttachmentId, FileId, ItemId, WorkspaceId};

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::{get_enum, get_id, get_opt_id};

const COLUMNS: &str = "id, workspace_id, item_id, file_id, external_ref, attachment_type, \
                       title, is_primary, created_at, updated_at";

/// `SQLite` implementation of [`AttachmentRepository`].
#[derive(Clone)]
pub struct SqliteAttachmentRepository {
    db: Database,
}

fn clear_primary(
    conn: &Connection,
    item_id: &ItemId,
    keep: &AttachmentId,
    now: DateTime<Utc>,
) -> Result<()> {
    let _ = conn.execute(
        "UPDATE attachments SET is_primary = 0, updated_at = ?3
         WHERE item_id = ?1 AND id <> ?2 AND is_primary = 1",
        params![item_id.as_str(), keep.as_str(), now],
    )?;
    Ok(())
}

impl SqliteAttachmentRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Attachment> {
        Ok(Attachment {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            item_id: get_id(row, 2)?,
            file_id: get_opt_id(row, 3)?,
            external_ref: row.get(4)?,
            attachment_type: get_enum(row, 5)?,
            title: row.get(6)?,
            is_primary: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl AttachmentRepository for SqliteAttachmentRepository {
    fn save(&self, attachment: &Attachment) -> stockroom_core::Result<()> {
        self.db.with_tx(|tx| {
            if attachment.is_primary {
                clear_primary(tx, &attachment.item_id, &attachment.id, attachment.updated_at)?;
            }
            let _ = tx.execute(
                "INSERT INTO attachments (id, workspace_id, item_id, file_id, external_ref,
                                          attachment_type, title, is_primary, created_at,
                                          updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                     attachment_type = excluded.attachment_type,
                     title = excluded.title,
                     is_primary = excluded.is_primary,
                     updated_at = excluded.updated_at
                 WHERE attachments.workspace_id = excluded.workspace_id",
                params![
                    attachment.id.as_str(),
                    attachment.workspace_id.as_str(),
                    attachment.item_id.as_str(),
                    attachment.file_id.as_ref().map(FileId::as_str),
                    attachment.external_ref,
                    attachment.attachment_type.as_str(),
                    attachment.title,
                    attachment.is_primary,
                    attachment.created_at,
                    attachment.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(
        &self,
        workspace_id: &WorkspaceId,
        id: &AttachmentId,
    ) -> stockroom_core::Result<Option<Attachment>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM attachments WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> stockroom_core::Result<Vec<Attachment>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM attachments WHERE workspace_id = ?1 AND item_id = ?2
                 ORDER BY is_primary DESC, created_at, id"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str(), item_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn set_primary_for_item(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
        id: &AttachmentId,
        at: DateTime<Utc>,
    ) -> stockroom_core::Result<bool> {
        self.db.with_tx(|tx| {
            let belongs: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM attachments
                               WHERE workspace_id = ?1 AND item_id = ?2 AND id = ?3)",
                params![workspace_id.as_str(), item_id.as_str(), id.as_str()],
                |row| row.get(0),
            )?;
            if !belongs {
                return Ok(false);
            }
            clear_primary(tx, item_id, id, at)?;
            let _ = tx.execute(
                "UPDATE attachments SET is_primary = 1, updated_at = ?2 WHERE id = ?1",
                params![id.as_str(), at],
            )?;
            Ok(true)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &AttachmentId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM attachments WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, item};
    use assert_matches::assert_matches;
    use stockroom_core::DomainError;
    use stockroom_core::attachment::{AttachmentType, CreateAttachment};

    fn link(ws: &WorkspaceId, item_id: &ItemId, reference: &str, primary: bool) -> Attachment {
        Attachment::new(
            ws.clone(),
            item_id.clone(),
            &CreateAttachment {
                attachment_type: AttachmentType::Manual,
                external_ref: Some(reference.into()),
                is_primary: primary,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn primaries(repo: &SqliteAttachmentRepository, ws: &WorkspaceId, item_id: &ItemId) -> Vec<AttachmentId> {
        repo.find_by_item(ws, item_id)
            .unwrap()
            .into_iter()
            .filter(|a| a.is_primary)
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn saving_primary_unsets_previous() {
        let (db, ws) = fixture();
        let repo = SqliteAttachmentRepository::new(db.clone());
        let drill = item(&db, &ws, "DRL", 0);
        let first = link(&ws, &drill.id, "doc-1", true);
        let second = link(&ws, &drill.id, "doc-2", true);
        repo.save(&first).unwrap();
        repo.save(&second).unwrap();

        assert_eq!(primaries(&repo, &ws, &drill.id), vec![second.id.clone()]);
        let listed = repo.find_by_item(&ws, &drill.id).unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[0].attachment_type, AttachmentType::Manual);
    }

    #[test]
    fn set_primary_swaps_atomically() {
        let (db, ws) = fixture();
        let repo = SqliteAttachmentRepository::new(db.clone());
        let drill = item(&db, &ws, "DRL", 0);
        let saw = item(&db, &ws, "SAW", 0);
        let a = link(&ws, &drill.id, "doc-a", true);
        let b = link(&ws, &drill.id, "doc-b", false);
        let other = link(&ws, &saw.id, "doc-c", true);
        for att in [&a, &b, &other] {
            repo.save(att).unwrap();
        }

        assert!(repo.set_primary_for_item(&ws, &drill.id, &b.id, Utc::now()).unwrap());
        assert_eq!(primaries(&repo, &ws, &drill.id), vec![b.id.clone()]);
        assert_eq!(primaries(&repo, &ws, &saw.id), vec![other.id.clone()]);
        assert!(!repo.set_primary_for_item(&ws, &drill.id, &other.id, Utc::now()).unwrap());
    }

    #[test]
    fn file_or_reference_enforced_by_schema() {
        let (db, ws) = fixture();
        let repo = SqliteAttachmentRepository::new(db.clone());
        let drill = item(&db, &ws, "DRL", 0);
        let mut broken = link(&ws, &drill.id, "doc", false);
        broken.external_ref = None;
        assert_matches!(repo.save(&broken), Err(DomainError::Storage(_)));
    }
}
