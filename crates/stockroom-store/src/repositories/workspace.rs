//! `workspaces` table.

use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::workspace::{Workspace, WorkspaceRepository};
use stockroom_core::WorkspaceId;

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::get_id;

const COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// `SQLite` implementation of [`WorkspaceRepository`].
#[derive(Clone)]
pub struct SqliteWorkspaceRepository {
    db: Database,
}

impl SqliteWorkspaceRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Workspace> {
        Ok(Workspace {
            id: get_id(row, 0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn query_one(conn: &Connection, filter: &str, value: &str) -> Result<Option<Workspace>> {
        let sql = format!("SELECT {COLUMNS} FROM workspaces WHERE {filter} = ?1");
        Ok(conn
            .query_row(&sql, params![value], Self::map_row)
            .optional()?)
    }
}

impl WorkspaceRepository for SqliteWorkspaceRepository {
    fn save(&self, workspace: &Workspace) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO workspaces (id, name, slug, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     slug = excluded.slug,
                     description = excluded.description,
                     updated_at = excluded.updated_at",
                params![
                    workspace.id.as_str(),
                    workspace.name,
                    workspace.slug,
                    workspace.description,
                    workspace.created_at,
                    workspace.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(&self, id: &WorkspaceId) -> stockroom_core::Result<Option<Workspace>> {
        self.db.with_conn(|conn| Self::query_one(conn, "id", id.as_str()))
    }

    fn find_by_slug(&self, slug: &str) -> stockroom_core::Result<Option<Workspace>> {
        self.db.with_conn(|conn| Self::query_one(conn, "slug", slug))
    }

    fn list(&self) -> stockroom_core::Result<Vec<Workspace>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM workspaces ORDER BY name"))?;
            let rows = stmt
                .query_map([], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn delete(&self, id: &WorkspaceId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM workspaces WHERE id = ?1", params![id.as_str()])?;
            Ok(changed > 0)
        })
    }
}
