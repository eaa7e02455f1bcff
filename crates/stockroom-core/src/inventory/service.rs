use std::sync::Arc;

use tracing::{info, instrument};

use crate::container::ContainerRepository;
use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, InventoryId, LocationId, WorkspaceId};
use crate::item::ItemRepository;
use crate::location::LocationRepository;
use crate::movement::{Movement, RecordMovement};

use super::{
    CreateInventory, Inventory, InventoryFilter, InventoryRepository, InventoryStatus,
    MoveInventory, UpdateInventory,
};

/// Inventory use cases.
#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
    items: Arc<dyn ItemRepository>,
    locations: Arc<dyn LocationRepository>,
    containers: Arc<dyn ContainerRepository>,
}

impl InventoryService {
    /// Create a service over the inventory repository and the repositories of
    /// the entities it references.
    pub fn new(
        repo: Arc<dyn InventoryRepository>,
        items: Arc<dyn ItemRepository>,
        locations: Arc<dyn LocationRepository>,
        containers: Arc<dyn ContainerRepository>,
    ) -> Self {
        Self {
            repo,
            items,
            locations,
            containers,
        }
    }

    /// Check that a location exists and, if given, that the container sits there.
    fn ensure_place(
        &self,
        workspace_id: &WorkspaceId,
        location_id: &LocationId,
        container_id: Option<&ContainerId>,
    ) -> Result<()> {
        if self.locations.find_by_id(workspace_id, location_id)?.is_none() {
            return Err(DomainError::not_found("location", location_id));
        }
        if let Some(container_id) = container_id {
            let container = self
                .containers
                .find_by_id(workspace_id, container_id)?
                .ok_or_else(|| DomainError::not_found("container", container_id))?;
            if &container.location_id != location_id {
                return Err(DomainError::validation(
                    "container_id",
                    "container is not at the chosen location",
                ));
            }
        }
        Ok(())
    }

    fn ensure_not_on_loan(inventory: &Inventory, action: &str) -> Result<()> {
        if inventory.status == InventoryStatus::OnLoan {
            return Err(DomainError::conflict(format!(
                "cannot {action} inventory that is on loan"
            )));
        }
        Ok(())
    }

    /// Create an inventory record.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, item_id = %params.item_id))]
    pub fn create(
        &self,
        workspace_id: &WorkspaceId,
        params: &CreateInventory,
    ) -> Result<Inventory> {
        let inventory = Inventory::new(workspace_id.clone(), params)?;
        if self.items.find_by_id(workspace_id, &inventory.item_id)?.is_none() {
            return Err(DomainError::not_found("item", &inventory.item_id));
        }
        self.ensure_place(
            workspace_id,
            &inventory.location_id,
            inventory.container_id.as_ref(),
        )?;
        self.repo.save(&inventory)?;
        info!(inventory_id = %inventory.id, quantity = inventory.quantity, "inventory created");
        Ok(inventory)
    }

    /// Fetch a record or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &InventoryId) -> Result<Inventory> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("inventory", id))
    }

    /// Records matching `filter`.
    pub fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &InventoryFilter,
    ) -> Result<Vec<Inventory>> {
        self.repo.list(workspace_id, filter)
    }

    /// Update descriptive fields.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &InventoryId,
        params: &UpdateInventory,
    ) -> Result<Inventory> {
        let mut inventory = self.get(workspace_id, id)?;
        inventory.apply(params)?;
        self.repo.save(&inventory)?;
        Ok(inventory)
    }

    /// Set the quantity on hand.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn set_quantity(
        &self,
        workspace_id: &WorkspaceId,
        id: &InventoryId,
        quantity: i64,
    ) -> Result<Inventory> {
        let quantity = crate::validate::non_negative("quantity", quantity)?;
        let mut inventory = self.get(workspace_id, id)?;
        Self::ensure_not_on_loan(&inventory, "adjust")?;
        let previous = inventory.quantity;
        inventory.quantity = quantity;
        inventory.touch();
        self.repo.save(&inventory)?;
        info!(previous, quantity, "inventory quantity adjusted");
        Ok(inventory)
    }

    /// Change availability. `ON_LOAN` is owned by the loan workflow.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn change_status(
        &self,
        workspace_id: &WorkspaceId,
        id: &InventoryId,
        status: InventoryStatus,
    ) -> Result<Inventory> {
        if status == InventoryStatus::OnLoan {
            return Err(DomainError::validation(
                "status",
                "ON_LOAN is set by creating a loan",
            ));
        }
        let mut inventory = self.get(workspace_id, id)?;
        Self::ensure_not_on_loan(&inventory, "change the status of")?;
        inventory.status = status;
        inventory.touch();
        self.repo.save(&inventory)?;
        info!(status = %status, "inventory status changed");
        Ok(inventory)
    }

    /// Move the whole record to another place and record the movement.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn move_to(
        &self,
        workspace_id: &WorkspaceId,
        id: &InventoryId,
        params: &MoveInventory,
    ) -> Result<(Inventory, Movement)> {
        let mut inventory = self.get(workspace_id, id)?;
        Self::ensure_not_on_loan(&inventory, "move")?;
        self.ensure_place(workspace_id, &params.location_id, params.container_id.as_ref())?;
        if inventory.quantity == 0 {
            return Err(DomainError::validation(
                "quantity",
                "record holds no stock to move",
            ));
        }

        let movement = Movement::new(
            workspace_id.clone(),
            &RecordMovement {
                inventory_id: inventory.id.clone(),
                from_location_id: Some(inventory.location_id.clone()),
                from_container_id: inventory.container_id.clone(),
                to_location_id: Some(params.location_id.clone()),
                to_container_id: params.container_id.clone(),
                quantity: inventory.quantity,
                moved_by: params.moved_by.clone(),
                reason: params.reason.clone(),
            },
        )?;

        inventory.location_id = params.location_id.clone();
        inventory.container_id = params.container_id.clone();
        inventory.touch();
        self.repo.save_with_movement(&inventory, &movement)?;
        info!(movement_id = %movement.id, "inventory moved");
        Ok((inventory, movement))
    }

    /// Hide a record from default listings. Idempotent.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn archive(&self, workspace_id: &WorkspaceId, id: &InventoryId) -> Result<Inventory> {
        let mut inventory = self.get(workspace_id, id)?;
        if !inventory.is_archived {
            Self::ensure_not_on_loan(&inventory, "archive")?;
            inventory.is_archived = true;
            inventory.touch();
            self.repo.save(&inventory)?;
            info!("inventory archived");
        }
        Ok(inventory)
    }

    /// Delete a record that is not on loan.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, inventory_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &InventoryId) -> Result<()> {
        let inventory = self.get(workspace_id, id)?;
        Self::ensure_not_on_loan(&inventory, "delete")?;
        let _ = self.repo.delete(workspace_id, id)?;
        info!("inventory deleted");
        Ok(())
    }
}
