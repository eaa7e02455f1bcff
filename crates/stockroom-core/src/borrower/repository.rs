use crate::errors::Result;
use crate::ids::{BorrowerId, WorkspaceId};

use super::Borrower;

/// Persistence seam for borrowers.
#[cfg_attr(test, mockall::automock)]
pub trait BorrowerRepository: Send + Sync {
    /// Insert or replace a borrower.
    fn save(&self, borrower: &Borrower) -> Result<()>;

    /// Look up a borrower inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> Result<Option<Borrower>>;

    /// All borrowers of a workspace, ordered by name.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<Borrower>>;

    /// Number of loans to this borrower that are not yet returned.
    fn active_loan_count(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> Result<u64>;

    /// Delete a borrower and their returned loans.
    fn delete(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> Result<bool>;
}
