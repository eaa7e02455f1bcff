use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::ids::{LoanId, WorkspaceId};

use super::{Loan, LoanFilter};

/// Persistence seam for loans.
#[cfg_attr(test, mockall::automock)]
pub trait LoanRepository: Send + Sync {
    /// Insert or replace a loan.
    fn save(&self, loan: &Loan) -> Result<()>;

    /// Insert a new loan and flip its inventory to `ON_LOAN` in one
    /// transaction. The flip only applies while the inventory is still
    /// `AVAILABLE` and holds at least `loan.quantity`; otherwise nothing is
    /// written and `false` is returned.
    fn open_loan(&self, loan: &Loan) -> Result<bool>;

    /// Record `loan.returned_at` and flip its inventory back to `AVAILABLE`
    /// in one transaction. Returns `false` without writing if the stored loan
    /// was already returned.
    fn close_loan(&self, loan: &Loan) -> Result<bool>;

    /// Look up a loan inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &LoanId) -> Result<Option<Loan>>;

    /// Loans matching `filter`, newest first. `now` decides overdue.
    fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &LoanFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Loan>>;
}
