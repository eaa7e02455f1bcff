use crate::errors::Result;
use crate::ids::{InventoryId, MovementId, WorkspaceId};
use crate::pagination::{Page, PageRequest};

use super::Movement;

/// Persistence seam for movements. Records are append-only.
#[cfg_attr(test, mockall::automock)]
pub trait MovementRepository: Send + Sync {
    /// Append a movement.
    fn save(&self, movement: &Movement) -> Result<()>;

    /// Look up a movement inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &MovementId) -> Result<Option<Movement>>;

    /// One page of the workspace's movements, newest first.
    fn list(&self, workspace_id: &WorkspaceId, page: PageRequest) -> Result<Page<Movement>>;

    /// Every movement of one inventory record, newest first.
    fn find_by_inventory(
        &self,
        workspace_id: &WorkspaceId,
        inventory_id: &InventoryId,
    ) -> Result<Vec<Movement>>;
}
