use crate::errors::Result;
use crate::ids::{ContainerId, LocationId, WorkspaceId};

use super::Container;

/// Persistence seam for containers.
#[cfg_attr(test, mockall::automock)]
pub trait ContainerRepository: Send + Sync {
    /// Insert or replace a container.
    fn save(&self, container: &Container) -> Result<()>;

    /// Look up a container inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &ContainerId)
        -> Result<Option<Container>>;

    /// Look up a container by its short code.
    fn find_by_short_code(
        &self,
        workspace_id: &WorkspaceId,
        short_code: &str,
    ) -> Result<Option<Container>>;

    /// All containers of a workspace, ordered by name.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<Container>>;

    /// Containers at one location.
    fn find_by_location(
        &self,
        workspace_id: &WorkspaceId,
        location_id: &LocationId,
    ) -> Result<Vec<Container>>;

    /// Number of inventory records inside the container.
    fn inventory_count(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> Result<u64>;

    /// Delete a container. Returns whether a row was removed.
    fn delete(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> Result<bool>;
}
