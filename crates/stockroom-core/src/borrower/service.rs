use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::{DomainError, Result};
use crate::ids::{BorrowerId, WorkspaceId};

use super::{Borrower, BorrowerRepository, CreateBorrower, UpdateBorrower};

/// Borrower use cases.
#[derive(Clone)]
pub struct BorrowerService {
    repo: Arc<dyn BorrowerRepository>,
}

impl BorrowerService {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<dyn BorrowerRepository>) -> Self {
        Self { repo }
    }

    /// Create a borrower.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateBorrower) -> Result<Borrower> {
        let borrower = Borrower::new(workspace_id.clone(), params)?;
        self.repo.save(&borrower)?;
        info!(borrower_id = %borrower.id, "borrower created");
        Ok(borrower)
    }

    /// Fetch a borrower or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> Result<Borrower> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("borrower", id))
    }

    /// All borrowers of a workspace.
    pub fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Borrower>> {
        self.repo.find_by_workspace(workspace_id)
    }

    /// Apply a partial update.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, borrower_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &BorrowerId,
        params: &UpdateBorrower,
    ) -> Result<Borrower> {
        let mut borrower = self.get(workspace_id, id)?;
        borrower.apply(params)?;
        self.repo.save(&borrower)?;
        Ok(borrower)
    }

    /// Delete a borrower with no outstanding loans.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, borrower_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &BorrowerId) -> Result<()> {
        let _ = self.get(workspace_id, id)?;
        let active = self.repo.active_loan_count(workspace_id, id)?;
        if active > 0 {
            return Err(DomainError::conflict(format!(
                "borrower still has {active} active loans"
            )));
        }
        let _ = self.repo.delete(workspace_id, id)?;
        info!("borrower deleted");
        Ok(())
    }
}
