use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::borrower::BorrowerRepository;
use crate::errors::{DomainError, Result};
use crate::ids::{LoanId, WorkspaceId};
use crate::inventory::{InventoryRepository, InventoryStatus};

use super::{CreateLoan, ExtendLoan, Loan, LoanFilter, LoanRepository};

/// Loan use cases. Creating and returning loans flips the inventory status.
#[derive(Clone)]
pub struct LoanService {
    repo: Arc<dyn LoanRepository>,
    inventory: Arc<dyn InventoryRepository>,
    borrowers: Arc<dyn BorrowerRepository>,
}

impl LoanService {
    /// Create a service over the loan, inventory and borrower repositories.
    pub fn new(
        repo: Arc<dyn LoanRepository>,
        inventory: Arc<dyn InventoryRepository>,
        borrowers: Arc<dyn BorrowerRepository>,
    ) -> Self {
        Self {
            repo,
            inventory,
            borrowers,
        }
    }

    /// Lend available stock to a borrower.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, inventory_id = %params.inventory_id))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateLoan) -> Result<Loan> {
        let loan = Loan::new(workspace_id.clone(), params)?;
        if self
            .borrowers
            .find_by_id(workspace_id, &loan.borrower_id)?
            .is_none()
        {
            return Err(DomainError::not_found("borrower", &loan.borrower_id));
        }
        let inventory = self
            .inventory
            .find_by_id(workspace_id, &loan.inventory_id)?
            .ok_or_else(|| DomainError::not_found("inventory", &loan.inventory_id))?;
        if inventory.status != InventoryStatus::Available {
            return Err(DomainError::conflict(format!(
                "inventory is {}, not AVAILABLE",
                inventory.status
            )));
        }
        if loan.quantity > inventory.quantity {
            return Err(DomainError::validation(
                "quantity",
                format!(
                    "cannot lend {} units, only {} in stock",
                    loan.quantity, inventory.quantity
                ),
            ));
        }
        // Re-checked atomically; another loan may have claimed the stock since.
        if !self.repo.open_loan(&loan)? {
            return Err(DomainError::conflict(
                "inventory is no longer available for this loan",
            ));
        }
        info!(loan_id = %loan.id, borrower_id = %loan.borrower_id, "loan created");
        Ok(loan)
    }

    /// Fetch a loan or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &LoanId) -> Result<Loan> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("loan", id))
    }

    /// Loans matching `filter`.
    pub fn list(&self, workspace_id: &WorkspaceId, filter: &LoanFilter) -> Result<Vec<Loan>> {
        self.repo.list(workspace_id, filter, Utc::now())
    }

    /// Mark a loan returned and make the stock available again.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, loan_id = %id))]
    pub fn return_loan(&self, workspace_id: &WorkspaceId, id: &LoanId) -> Result<Loan> {
        let mut loan = self.get(workspace_id, id)?;
        loan.mark_returned(Utc::now())?;
        if !self.repo.close_loan(&loan)? {
            return Err(DomainError::conflict("loan has already been returned"));
        }
        info!("loan returned");
        Ok(loan)
    }

    /// Move the due date of an active loan.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, loan_id = %id))]
    pub fn extend(
        &self,
        workspace_id: &WorkspaceId,
        id: &LoanId,
        params: &ExtendLoan,
    ) -> Result<Loan> {
        let mut loan = self.get(workspace_id, id)?;
        loan.extend(params.due_date)?;
        self.repo.save(&loan)?;
        info!(due_date = %params.due_date, "loan extended");
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrower::{Borrower, CreateBorrower, MockBorrowerRepository};
    use crate::ids::{BorrowerId, ItemId, LocationId};
    use crate::inventory::{CreateInventory, Inventory, MockInventoryRepository};
    use crate::loan::MockLoanRepository;
    use assert_matches::assert_matches;

    fn ws() -> WorkspaceId {
        WorkspaceId::from("ws-1")
    }

    fn stock(status: InventoryStatus, quantity: i64) -> Inventory {
        let mut inv = Inventory::new(
            ws(),
            &CreateInventory {
                item_id: ItemId::from("item-1"),
                location_id: LocationId::from("loc-1"),
                quantity,
                ..Default::default()
            },
        )
        .unwrap();
        inv.status = status;
        inv
    }

    fn borrowers() -> MockBorrowerRepository {
        let borrower = Borrower::new(
            ws(),
            &CreateBorrower {
                name: "Robin".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let mut repo = MockBorrowerRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(borrower.clone())));
        repo
    }

    fn inventory_of(inv: Inventory) -> MockInventoryRepository {
        let mut repo = MockInventoryRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(inv.clone())));
        repo
    }

    fn request(inv: &Inventory, quantity: i64) -> CreateLoan {
        CreateLoan {
            inventory_id: inv.id.clone(),
            borrower_id: BorrowerId::from("bor-1"),
            quantity,
            loaned_at: None,
            due_date: None,
            notes: None,
        }
    }

    #[test]
    fn create_flips_inventory_to_on_loan() {
        let inv = stock(InventoryStatus::Available, 2);
        let req = request(&inv, 2);
        let mut repo = MockLoanRepository::new();
        let _ = repo
            .expect_open_loan()
            .times(1)
            .returning(|loan| {
                assert_eq!(loan.quantity, 2);
                Ok(true)
            });
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        let loan = service.create(&ws(), &req).unwrap();
        assert!(loan.is_active());
    }

    #[test]
    fn create_conflicts_when_stock_was_claimed_meanwhile() {
        let inv = stock(InventoryStatus::Available, 1);
        let req = request(&inv, 1);
        let mut repo = MockLoanRepository::new();
        let _ = repo.expect_open_loan().times(1).returning(|_| Ok(false));
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        assert_matches!(service.create(&ws(), &req), Err(DomainError::Conflict(_)));
    }

    #[test]
    fn create_requires_available_stock() {
        let inv = stock(InventoryStatus::InUse, 2);
        let req = request(&inv, 1);
        let mut repo = MockLoanRepository::new();
        let _ = repo.expect_open_loan().never();
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        assert_matches!(service.create(&ws(), &req), Err(DomainError::Conflict(_)));
    }

    #[test]
    fn create_rejects_more_than_stock() {
        let inv = stock(InventoryStatus::Available, 1);
        let req = request(&inv, 3);
        let mut repo = MockLoanRepository::new();
        let _ = repo.expect_open_loan().never();
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        assert_matches!(
            service.create(&ws(), &req),
            Err(DomainError::Validation { ref field, .. }) if field == "quantity"
        );
    }

    #[test]
    fn return_makes_stock_available() {
        let inv = stock(InventoryStatus::OnLoan, 1);
        let loan = Loan::new(ws(), &request(&inv, 1)).unwrap();
        let id = loan.id.clone();
        let mut repo = MockLoanRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(loan.clone())));
        let _ = repo
            .expect_close_loan()
            .times(1)
            .returning(|loan| {
                assert!(loan.returned_at.is_some());
                Ok(true)
            });
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        let returned = service.return_loan(&ws(), &id).unwrap();
        assert!(!returned.is_active());
    }

    #[test]
    fn concurrent_return_conflicts() {
        let inv = stock(InventoryStatus::OnLoan, 1);
        let loan = Loan::new(ws(), &request(&inv, 1)).unwrap();
        let id = loan.id.clone();
        let mut repo = MockLoanRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(loan.clone())));
        let _ = repo.expect_close_loan().times(1).returning(|_| Ok(false));
        let service = LoanService::new(Arc::new(repo), Arc::new(inventory_of(inv)), Arc::new(borrowers()));

        assert_matches!(service.return_loan(&ws(), &id), Err(DomainError::Conflict(_)));
    }
}
