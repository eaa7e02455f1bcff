//! Loans of inventory to borrowers.

mod repository;
mod service;

pub use repository::LoanRepository;
#[cfg(test)]
pub use repository::MockLoanRepository;
pub use service::LoanService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{BorrowerId, InventoryId, LoanId, WorkspaceId};
use crate::validate;

const NOTES_MAX: usize = 2000;

/// A loan of some quantity of an inventory record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Loan ID.
    pub id: LoanId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Lent inventory record.
    pub inventory_id: InventoryId,
    /// Who has it.
    pub borrower_id: BorrowerId,
    /// Units lent.
    pub quantity: i64,
    /// When it was lent.
    pub loaned_at: DateTime<Utc>,
    /// When it should come back.
    pub due_date: Option<DateTime<Utc>>,
    /// When it came back; `None` while active.
    pub returned_at: Option<DateTime<Utc>>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

fn one() -> i64 {
    1
}

/// Input for [`LoanService::create`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateLoan {
    /// Inventory record to lend.
    pub inventory_id: InventoryId,
    /// Borrower.
    pub borrower_id: BorrowerId,
    /// Units to lend, defaults to 1.
    #[serde(default = "one")]
    pub quantity: i64,
    /// Backdated loan time; defaults to now.
    pub loaned_at: Option<DateTime<Utc>>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Notes.
    pub notes: Option<String>,
}

/// Input for [`LoanService::extend`].
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ExtendLoan {
    /// New due date.
    pub due_date: DateTime<Utc>,
}

/// Listing filter. Flags combine with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LoanFilter {
    /// Only loans not yet returned.
    #[serde(default)]
    pub active: bool,
    /// Only active loans past their due date.
    #[serde(default)]
    pub overdue: bool,
    /// Only loans to this borrower.
    pub borrower_id: Option<BorrowerId>,
}

fn validate_due_date(loaned_at: DateTime<Utc>, due: Option<DateTime<Utc>>) -> Result<()> {
    match due {
        Some(due) if due <= loaned_at => Err(DomainError::validation(
            "due_date",
            "must be after the loan date",
        )),
        _ => Ok(()),
    }
}

impl Loan {
    /// Validate input and build a new active loan.
    pub fn new(workspace_id: WorkspaceId, params: &CreateLoan) -> Result<Self> {
        let now = Utc::now();
        let loaned_at = params.loaned_at.unwrap_or(now);
        validate_due_date(loaned_at, params.due_date)?;
        Ok(Self {
            id: LoanId::new(),
            workspace_id,
            inventory_id: params.inventory_id.clone(),
            borrower_id: params.borrower_id.clone(),
            quantity: validate::positive("quantity", params.quantity)?,
            loaned_at,
            due_date: params.due_date,
            returned_at: None,
            notes: validate::optional("notes", params.notes.as_deref(), NOTES_MAX)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the loan has not been returned.
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Whether the loan is active and past its due date at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.due_date.is_some_and(|due| due < now)
    }

    /// Mark the loan returned at `now`.
    pub fn mark_returned(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(DomainError::conflict("loan has already been returned"));
        }
        self.returned_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Move the due date.
    pub fn extend(&mut self, due_date: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(DomainError::conflict("cannot extend a returned loan"));
        }
        validate_due_date(self.loaned_at, Some(due_date))?;
        self.due_date = Some(due_date);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn params() -> CreateLoan {
        CreateLoan {
            inventory_id: InventoryId::from("inv-1"),
            borrower_id: BorrowerId::from("bor-1"),
            quantity: 1,
            loaned_at: None,
            due_date: None,
            notes: None,
        }
    }

    #[test]
    fn quantity_defaults_to_one() {
        let p: CreateLoan =
            serde_json::from_str(r#"{"inventory_id":"inv-1","borrower_id":"bor-1"}"#).unwrap();
        assert_eq!(p.quantity, 1);
    }

    #[test]
    fn due_date_after_loan() {
        let now = Utc::now();
        let result = Loan::new(
            WorkspaceId::from("ws-1"),
            &CreateLoan {
                loaned_at: Some(now),
                due_date: Some(now - Duration::days(1)),
                ..params()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn overdue_only_while_active() {
        let now = Utc::now();
        let mut loan = Loan::new(
            WorkspaceId::from("ws-1"),
            &CreateLoan {
                loaned_at: Some(now - Duration::days(10)),
                due_date: Some(now - Duration::days(3)),
                ..params()
            },
        )
        .unwrap();
        assert!(loan.is_overdue(now));
        loan.mark_returned(now).unwrap();
        assert!(!loan.is_overdue(now));
    }

    #[test]
    fn return_twice_conflicts() {
        let mut loan = Loan::new(WorkspaceId::from("ws-1"), &params()).unwrap();
        loan.mark_returned(Utc::now()).unwrap();
        assert_matches!(loan.mark_returned(Utc::now()), Err(DomainError::Conflict(_)));
        assert_matches!(
            loan.extend(Utc::now() + Duration::days(7)),
            Err(DomainError::Conflict(_))
        );
    }
}
