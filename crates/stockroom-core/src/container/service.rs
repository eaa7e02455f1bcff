use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::{DomainError, Result};
use crate::ids::{ContainerId, LocationId, WorkspaceId};
use crate::location::LocationRepository;

use super::{Container, ContainerRepository, CreateContainer, UpdateContainer};

/// Container use cases.
#[derive(Clone)]
pub struct ContainerService {
    repo: Arc<dyn ContainerRepository>,
    locations: Arc<dyn LocationRepository>,
}

impl ContainerService {
    /// Create a service over the container and location repositories.
    pub fn new(
        repo: Arc<dyn ContainerRepository>,
        locations: Arc<dyn LocationRepository>,
    ) -> Self {
        Self { repo, locations }
    }

    fn ensure_location(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<()> {
        if self.locations.find_by_id(workspace_id, id)?.is_none() {
            return Err(DomainError::not_found("location", id));
        }
        Ok(())
    }

    fn ensure_short_code_free(&self, container: &Container) -> Result<()> {
        let Some(ref code) = container.short_code else {
            return Ok(());
        };
        match self
            .repo
            .find_by_short_code(&container.workspace_id, code)?
        {
            Some(other) if other.id != container.id => Err(DomainError::conflict(format!(
                "short code '{code}' is already used by another container"
            ))),
            _ => Ok(()),
        }
    }

    /// Create a container at an existing location.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id))]
    pub fn create(
        &self,
        workspace_id: &WorkspaceId,
        params: &CreateContainer,
    ) -> Result<Container> {
        let container = Container::new(workspace_id.clone(), params)?;
        self.ensure_location(workspace_id, &container.location_id)?;
        self.ensure_short_code_free(&container)?;
        self.repo.save(&container)?;
        info!(container_id = %container.id, "container created");
        Ok(container)
    }

    /// Fetch a container or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> Result<Container> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("container", id))
    }

    /// Containers of a workspace, optionally restricted to one location.
    pub fn list(
        &self,
        workspace_id: &WorkspaceId,
        location_id: Option<&LocationId>,
    ) -> Result<Vec<Container>> {
        match location_id {
            Some(location_id) => self.repo.find_by_location(workspace_id, location_id),
            None => self.repo.find_by_workspace(workspace_id),
        }
    }

    /// Apply a partial update, possibly moving the container.
    ///
    /// Only an empty container can change location. Stock inside must be
    /// moved out first so every record stays at its container's location.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, container_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &ContainerId,
        params: &UpdateContainer,
    ) -> Result<Container> {
        let mut container = self.get(workspace_id, id)?;
        let previous_location = container.location_id.clone();
        container.apply(params)?;
        if container.location_id != previous_location {
            self.ensure_location(workspace_id, &container.location_id)?;
            let stored = self.repo.inventory_count(workspace_id, id)?;
            if stored > 0 {
                return Err(DomainError::conflict(format!(
                    "container still holds {stored} inventory records; move them before relocating it"
                )));
            }
        }
        self.ensure_short_code_free(&container)?;
        self.repo.save(&container)?;
        Ok(container)
    }

    /// Delete an empty container.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, container_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> Result<()> {
        let _ = self.get(workspace_id, id)?;
        let stored = self.repo.inventory_count(workspace_id, id)?;
        if stored > 0 {
            return Err(DomainError::conflict(format!(
                "container still holds {stored} inventory records"
            )));
        }
        let _ = self.repo.delete(workspace_id, id)?;
        info!("container deleted");
        Ok(())
    }
}
