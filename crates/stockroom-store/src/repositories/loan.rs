//! `loans` table.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use stockroom_core::inventory::InventoryStatus;
use stockroom_core::loan::{Loan, LoanFilter, LoanRepository};
use stockroom_core::{BorrowerId, LoanId, WorkspaceId};

use crate::database::Database;
use crate::errors::Result;
use crate::row_helpers::get_id;

const COLUMNS: &str = "id, workspace_id, inventory_id, borrower_id, quantity, loaned_at, \
                       due_date, returned_at, notes, created_at, updated_at";

/// `SQLite` implementation of [`LoanRepository`].
#[derive(Clone)]
pub struct SqliteLoanRepository {
    db: Database,
}

fn upsert(conn: &Connection, loan: &Loan) -> Result<()> {
    let _ = conn.execute(
        "INSERT INTO loans (id, workspace_id, inventory_id, borrower_id, quantity, loaned_at,
                            due_date, returned_at, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             due_date = excluded.due_date,
             returned_at = excluded.returned_at,
             notes = excluded.notes,
             updated_at = excluded.updated_at
         WHERE loans.workspace_id = excluded.workspace_id",
        params![
            loan.id.as_str(),
            loan.workspace_id.as_str(),
            loan.inventory_id.as_str(),
            loan.borrower_id.as_str(),
            loan.quantity,
            loan.loaned_at,
            loan.due_date,
            loan.returned_at,
            loan.notes,
            loan.created_at,
            loan.updated_at,
        ],
    )?;
    Ok(())
}

impl SqliteLoanRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
        Ok(Loan {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            inventory_id: get_id(row, 2)?,
            borrower_id: get_id(row, 3)?,
            quantity: row.get(4)?,
            loaned_at: row.get(5)?,
            due_date: row.get(6)?,
            returned_at: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl LoanRepository for SqliteLoanRepository {
    fn save(&self, loan: &Loan) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| upsert(conn, loan))
    }

    fn open_loan(&self, loan: &Loan) -> stockroom_core::Result<bool> {
        self.db.with_tx(|tx| {
            let claimed = tx.execute(
                "UPDATE inventory SET status = ?1, updated_at = ?2
                 WHERE workspace_id = ?3 AND id = ?4 AND status = ?5 AND quantity >= ?6",
                params![
                    InventoryStatus::OnLoan.as_str(),
                    loan.created_at,
                    loan.workspace_id.as_str(),
                    loan.inventory_id.as_str(),
                    InventoryStatus::Available.as_str(),
                    loan.quantity,
                ],
            )?;
            if claimed == 0 {
                return Ok(false);
            }
            upsert(tx, loan)?;
            Ok(true)
        })
    }

    fn close_loan(&self, loan: &Loan) -> stockroom_core::Result<bool> {
        self.db.with_tx(|tx| {
            let closed = tx.execute(
                "UPDATE loans SET returned_at = ?1, updated_at = ?2
                 WHERE workspace_id = ?3 AND id = ?4 AND returned_at IS NULL",
                params![
                    loan.returned_at,
                    loan.updated_at,
                    loan.workspace_id.as_str(),
                    loan.id.as_str(),
                ],
            )?;
            if closed == 0 {
                return Ok(false);
            }
            let _ = tx.execute(
                "UPDATE inventory SET status = ?1, updated_at = ?2
                 WHERE workspace_id = ?3 AND id = ?4 AND status = ?5",
                params![
                    InventoryStatus::Available.as_str(),
                    loan.updated_at,
                    loan.workspace_id.as_str(),
                    loan.inventory_id.as_str(),
                    InventoryStatus::OnLoan.as_str(),
                ],
            )?;
            Ok(true)
        })
    }

    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &LoanId) -> stockroom_core::Result<Option<Loan>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM loans WHERE workspace_id = ?1 AND id = ?2"),
                    params![workspace_id.as_str(), id.as_str()],
                    Self::map_row,
                )
                .optional()?)
        })
    }

    fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &LoanFilter,
        now: DateTime<Utc>,
    ) -> stockroom_core::Result<Vec<Loan>> {
        // UTC timestamps are stored as text with a fixed `+00:00` offset and sort as strings.
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM loans
                 WHERE workspace_id = ?1
                   AND (NOT ?2 OR returned_at IS NULL)
                   AND (NOT ?3 OR (returned_at IS NULL AND due_date IS NOT NULL AND due_date < ?4))
                   AND (?5 IS NULL OR borrower_id = ?5)
                 ORDER BY loaned_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map(
                    params![
                        workspace_id.as_str(),
                        filter.active,
                        filter.overdue,
                        now,
                        filter.borrower_id.as_ref().map(BorrowerId::as_str),
                    ],
                    Self::map_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
