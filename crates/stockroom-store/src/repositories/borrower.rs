//! `borrowers` table.

use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::borrower::{Borrower, BorrowerRepository};
use stockroom_core::{BorrowerId, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::{count, get_id};

const COLUMNS: &str = "id, workspace_id, name, email, phone, notes, created_at, updated_at";

/// `SQLite` implementation of [`BorrowerRepository`].
#[derive(Clone)]
pub struct SqliteBorrowerRepository {
    db: Database,
}

impl SqliteBorrowerRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Borrower> {
        Ok(Borrower {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl BorrowerRepository for SqliteBorrowerRepository {
    fn save(&self, borrower: &Borrower) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO borrowers (id, workspace_id, name, email, phone, notes, created_at,
                                        updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     email = excluded.email,
                     phone = excluded.phone,
                     notes = excluded.notes,
                     updated_at = excluded.updated_at
                 WHERE borrowers.workspace_id = excluded.workspace_id",
                params![
                    borrower.id.as_str(),
                    borrower.workspace_id.as_str(),
                    borrower.name,
                    borrower.email,
                    borrower.phone,
                    borrower.notes,
                    borrower.created_at,
                    borrower.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> stockroom_core::Result<Option<Borrower>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM borrowers WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<Borrower>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM borrowers WHERE workspace_id = ?1 ORDER BY name, id"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn active_loan_count(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> stockroom_core::Result<u64> {
        self.db.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM loans
                 WHERE workspace_id = ?1 AND borrower_id = ?2 AND returned_at IS NULL",
                params![workspace_id.as_str(), id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count(n))
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM borrowers WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}
