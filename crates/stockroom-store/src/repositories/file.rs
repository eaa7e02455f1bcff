//! `files` table: metadata of uploaded blobs.

use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::attachment::{FileRepository, StoredFile};
use stockroom_core::{FileId, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::get_id;

const COLUMNS: &str =
    "id, workspace_id, original_name, mime_type, size_bytes, checksum, storage_key, created_at";

/// `SQLite` implementation of [`FileRepository`].
#[derive(Clone)]
pub struct SqliteFileRepository {
    db: Database,
}

impl SqliteFileRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredFile> {
        Ok(StoredFile {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            original_name: row.get(2)?,
            mime_type: row.get(3)?,
            size_bytes: row.get(4)?,
            checksum: row.get(5)?,
            storage_key: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl FileRepository for SqliteFileRepository {
    fn save(&self, file: &StoredFile) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO files (id, workspace_id, original_name, mime_type, size_bytes,
                                    checksum, storage_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    file.id.as_str(),
                    file.workspace_id.as_str(),
                    file.original_name,
                    file.mime_type,
                    file.size_bytes,
                    file.checksum,
                    file.storage_key,
                    file.created_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &FileId) -> stockroom_core::Result<Option<StoredFile>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM files WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<StoredFile>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM files WHERE workspace_id = ?1 ORDER BY created_at"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &FileId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM files WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}
