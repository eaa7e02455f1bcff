//! Movement history: immutable audit records of stock changing place.

mod repository;
mod service;

pub use repository::MovementRepository;
#[cfg(test)]
pub use repository::MockMovementRepository;
pub use service::MovementService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, InventoryId, LocationId, MovementId, WorkspaceId};
use crate::validate;

const MOVED_BY_MAX: usize = 100;
const REASON_MAX: usize = 500;

/// A place stock can be moved from or to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Place {
    /// Location part.
    pub location_id: Option<LocationId>,
    /// Container part.
    pub container_id: Option<ContainerId>,
}

/// One recorded movement. Never updated after it is saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Movement ID.
    pub id: MovementId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Inventory record that moved.
    pub inventory_id: InventoryId,
    /// Source location.
    pub from_location_id: Option<LocationId>,
    /// Source container.
    pub from_container_id: Option<ContainerId>,
    /// Destination location.
    pub to_location_id: Option<LocationId>,
    /// Destination container.
    pub to_container_id: Option<ContainerId>,
    /// Units moved.
    pub quantity: i64,
    /// Who moved it.
    pub moved_by: Option<String>,
    /// Why.
    pub reason: Option<String>,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for [`MovementService::record`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordMovement {
    /// Inventory record that moved.
    pub inventory_id: InventoryId,
    /// Source location.
    pub from_location_id: Option<LocationId>,
    /// Source container.
    pub from_container_id: Option<ContainerId>,
    /// Destination location.
    pub to_location_id: Option<LocationId>,
    /// Destination container.
    pub to_container_id: Option<ContainerId>,
    /// Units moved.
    pub quantity: i64,
    /// Who moved it.
    pub moved_by: Option<String>,
    /// Why.
    pub reason: Option<String>,
}

impl Movement {
    /// Validate input and build a movement record.
    pub fn new(workspace_id: WorkspaceId, params: &RecordMovement) -> Result<Self> {
        let from = Place {
            location_id: params.from_location_id.clone(),
            container_id: params.from_container_id.clone(),
        };
        let to = Place {
            location_id: params.to_location_id.clone(),
            container_id: params.to_container_id.clone(),
        };
        if from == to {
            return Err(DomainError::validation(
                "to_location_id",
                "source and destination must differ",
            ));
        }
        Ok(Self {
            id: MovementId::new(),
            workspace_id,
            inventory_id: params.inventory_id.clone(),
            from_location_id: from.location_id,
            from_container_id: from.container_id,
            to_location_id: to.location_id,
            to_container_id: to.container_id,
            quantity: validate::positive("quantity", params.quantity)?,
            moved_by: validate::optional("moved_by", params.moved_by.as_deref(), MOVED_BY_MAX)?,
            reason: validate::optional("reason", params.reason.as_deref(), REASON_MAX)?,
            created_at: Utc::now(),
        })
    }
}
