use std::sync::Arc;

use tracing::{info, instrument};

use crate::container::ContainerRepository;
use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, InventoryId, LocationId, MovementId, WorkspaceId};
use crate::inventory::InventoryRepository;
use crate::location::LocationRepository;
use crate::pagination::{Page, PageRequest};

use super::{Movement, MovementRepository, RecordMovement};

/// Movement use cases.
#[derive(Clone)]
pub struct MovementService {
    repo: Arc<dyn MovementRepository>,
    inventory: Arc<dyn InventoryRepository>,
    locations: Arc<dyn LocationRepository>,
    containers: Arc<dyn ContainerRepository>,
}

impl MovementService {
    /// Create a service over the movement, inventory and place repositories.
    pub fn new(
        repo: Arc<dyn MovementRepository>,
        inventory: Arc<dyn InventoryRepository>,
        locations: Arc<dyn LocationRepository>,
        containers: Arc<dyn ContainerRepository>,
    ) -> Self {
        Self {
            repo,
            inventory,
            locations,
            containers,
        }
    }

    fn ensure_location(&self, workspace_id: &WorkspaceId, id: Option<&LocationId>) -> Result<()> {
        match id {
            Some(id) if self.locations.find_by_id(workspace_id, id)?.is_none() => {
                Err(DomainError::not_found("location", id))
            }
            _ => Ok(()),
        }
    }

    fn ensure_container(
        &self,
        workspace_id: &WorkspaceId,
        id: Option<&ContainerId>,
    ) -> Result<()> {
        match id {
            Some(id) if self.containers.find_by_id(workspace_id, id)?.is_none() => {
                Err(DomainError::not_found("container", id))
            }
            _ => Ok(()),
        }
    }

    /// Record a movement against an existing inventory record.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, inventory_id = %params.inventory_id))]
    pub fn record(&self, workspace_id: &WorkspaceId, params: &RecordMovement) -> Result<Movement> {
        let movement = Movement::new(workspace_id.clone(), params)?;
        let inventory = self
            .inventory
            .find_by_id(workspace_id, &movement.inventory_id)?
            .ok_or_else(|| DomainError::not_found("inventory", &movement.inventory_id))?;
        if movement.quantity > inventory.quantity {
            return Err(DomainError::validation(
                "quantity",
                format!(
                    "cannot move {} units, only {} in stock",
                    movement.quantity, inventory.quantity
                ),
            ));
        }
        self.ensure_location(workspace_id, movement.from_location_id.as_ref())?;
        self.ensure_location(workspace_id, movement.to_location_id.as_ref())?;
        self.ensure_container(workspace_id, movement.from_container_id.as_ref())?;
        self.ensure_container(workspace_id, movement.to_container_id.as_ref())?;
        self.repo.save(&movement)?;
        info!(movement_id = %movement.id, quantity = movement.quantity, "movement recorded");
        Ok(movement)
    }

    /// Fetch a movement or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &MovementId) -> Result<Movement> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("movement", id))
    }

    /// One page of movements, newest first.
    pub fn list(&self, workspace_id: &WorkspaceId, page: PageRequest) -> Result<Page<Movement>> {
        self.repo.list(workspace_id, page)
    }

    /// History of one inventory record.
    pub fn list_by_inventory(
        &self,
        workspace_id: &WorkspaceId,
        inventory_id: &InventoryId,
    ) -> Result<Vec<Movement>> {
        self.repo.find_by_inventory(workspace_id, inventory_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MockContainerRepository;
    use crate::ids::ItemId;
    use crate::inventory::{CreateInventory, Inventory, MockInventoryRepository};
    use crate::location::{CreateLocation, Location, MockLocationRepository};
    use crate::movement::MockMovementRepository;
    use assert_matches::assert_matches;

    fn ws() -> WorkspaceId {
        WorkspaceId::from("ws-1")
    }

    fn stock(quantity: i64) -> Inventory {
        Inventory::new(
            ws(),
            &CreateInventory {
                item_id: ItemId::from("item-1"),
                location_id: LocationId::from("loc-a"),
                quantity,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn params(inventory: &Inventory, quantity: i64) -> RecordMovement {
        RecordMovement {
            inventory_id: inventory.id.clone(),
            from_location_id: Some(LocationId::from("loc-a")),
            to_location_id: Some(LocationId::from("loc-b")),
            quantity,
            ..Default::default()
        }
    }

    fn known_locations() -> MockLocationRepository {
        let shelf = Location::new(
            ws(),
            &CreateLocation {
                name: "Shelf".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let mut locations = MockLocationRepository::new();
        let _ = locations
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(shelf.clone())));
        locations
    }

    fn service(
        repo: MockMovementRepository,
        inventory: MockInventoryRepository,
        locations: MockLocationRepository,
    ) -> MovementService {
        MovementService::new(
            Arc::new(repo),
            Arc::new(inventory),
            Arc::new(locations),
            Arc::new(MockContainerRepository::new()),
        )
    }

    #[test]
    fn record_saves_movement() {
        let inv = stock(5);
        let request = params(&inv, 5);
        let mut inventory = MockInventoryRepository::new();
        let _ = inventory
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(inv.clone())));
        let mut repo = MockMovementRepository::new();
        let _ = repo.expect_save().times(1).returning(|_| Ok(()));
        let service = service(repo, inventory, known_locations());

        let movement = service.record(&ws(), &request).unwrap();
        assert_eq!(movement.quantity, 5);
    }

    #[test]
    fn record_rejects_more_than_stock() {
        let inv = stock(1);
        let request = params(&inv, 2);
        let mut inventory = MockInventoryRepository::new();
        let _ = inventory
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(inv.clone())));
        let mut repo = MockMovementRepository::new();
        let _ = repo.expect_save().never();
        let service = service(repo, inventory, known_locations());

        let err = service.record(&ws(), &request).unwrap_err();
        assert_matches!(err, DomainError::Validation { ref field, .. } if field == "quantity");
    }

    #[test]
    fn record_requires_inventory() {
        let inv = stock(1);
        let request = params(&inv, 1);
        let mut inventory = MockInventoryRepository::new();
        let _ = inventory.expect_find_by_id().returning(|_, _| Ok(None));
        let service = service(
            MockMovementRepository::new(),
            inventory,
            MockLocationRepository::new(),
        );

        let err = service.record(&ws(), &request).unwrap_err();
        assert_matches!(err, DomainError::NotFound { entity: "inventory", .. });
    }

    #[test]
    fn record_rejects_location_outside_workspace() {
        let inv = stock(2);
        let request = params(&inv, 1);
        let mut inventory = MockInventoryRepository::new();
        let _ = inventory
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(inv.clone())));
        let mut locations = MockLocationRepository::new();
        let _ = locations.expect_find_by_id().returning(|_, _| Ok(None));
        let mut repo = MockMovementRepository::new();
        let _ = repo.expect_save().never();
        let service = service(repo, inventory, locations);

        let err = service.record(&ws(), &request).unwrap_err();
        assert_matches!(err, DomainError::NotFound { entity: "location", .. });
    }

    #[test]
    fn record_rejects_unknown_container() {
        let inv = stock(2);
        let mut request = params(&inv, 1);
        request.to_container_id = Some(ContainerId::from("box-elsewhere"));
        let mut inventory = MockInventoryRepository::new();
        let _ = inventory
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(inv.clone())));
        let mut containers = MockContainerRepository::new();
        let _ = containers.expect_find_by_id().returning(|_, _| Ok(None));
        let service = MovementService::new(
            Arc::new(MockMovementRepository::new()),
            Arc::new(inventory),
            Arc::new(known_locations()),
            Arc::new(containers),
        );

        let err = service.record(&ws(), &request).unwrap_err();
        assert_matches!(err, DomainError::NotFound { entity: "container", .. });
    }
}
