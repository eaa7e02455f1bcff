//! Containers (boxes, drawers, totes) placed at a location.

mod repository;
mod service;

pub use repository::ContainerRepository;
#[cfg(test)]
pub use repository::MockContainerRepository;
pub use service::ContainerService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, LocationId, WorkspaceId};
use crate::validate;

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

/// A movable container at a location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Container ID.
    pub id: ContainerId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Where the container currently sits.
    pub location_id: LocationId,
    /// Free-form description.
    pub description: Option<String>,
    /// Nominal capacity in units, if tracked.
    pub capacity: Option<i64>,
    /// Short code printed on labels, unique per workspace.
    pub short_code: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`ContainerService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateContainer {
    /// Display name.
    pub name: String,
    /// Location to place the container at.
    pub location_id: LocationId,
    /// Description.
    pub description: Option<String>,
    /// Capacity, must be positive.
    pub capacity: Option<i64>,
    /// Short code.
    pub short_code: Option<String>,
}

/// Partial update; setting `location_id` moves the container.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateContainer {
    /// Display name.
    pub name: Option<String>,
    /// New location.
    pub location_id: Option<LocationId>,
    /// Description.
    pub description: Option<String>,
    /// Capacity.
    pub capacity: Option<i64>,
    /// Short code.
    pub short_code: Option<String>,
}

fn validate_capacity(capacity: Option<i64>) -> Result<Option<i64>> {
    capacity
        .map(|c| validate::positive("capacity", c))
        .transpose()
}

impl Container {
    /// Validate input and build a new container.
    pub fn new(workspace_id: WorkspaceId, params: &CreateContainer) -> Result<Self> {
        if params.location_id.as_str().is_empty() {
            return Err(DomainError::validation("location_id", "must not be empty"));
        }
        let now = Utc::now();
        Ok(Self {
            id: ContainerId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            location_id: params.location_id.clone(),
            description: validate::optional(
                "description",
                params.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            capacity: validate_capacity(params.capacity)?,
            short_code: validate::short_code(params.short_code.as_deref())?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Location existence is checked by the service.
    pub fn apply(&mut self, params: &UpdateContainer) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if let Some(ref location_id) = params.location_id {
            self.location_id = location_id.clone();
        }
        validate::patch_optional(
            &mut self.description,
            "description",
            params.description.as_deref(),
            DESCRIPTION_MAX,
        )?;
        if params.capacity.is_some() {
            self.capacity = validate_capacity(params.capacity)?;
        }
        if let Some(ref code) = params.short_code {
            self.short_code = validate::short_code(Some(code))?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
