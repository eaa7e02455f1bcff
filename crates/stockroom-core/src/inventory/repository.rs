use crate::errors::Result;
use crate::ids::{InventoryId, WorkspaceId};
use crate::movement::Movement;

use super::{Inventory, InventoryFilter};

/// Persistence seam for inventory records.
#[cfg_attr(test, mockall::automock)]
pub trait InventoryRepository: Send + Sync {
    /// Insert or replace an inventory record.
    fn save(&self, inventory: &Inventory) -> Result<()>;

    /// Save a moved record and append its movement in one transaction.
    fn save_with_movement(&self, inventory: &Inventory, movement: &Movement) -> Result<()>;

    /// Look up a record inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &InventoryId)
        -> Result<Option<Inventory>>;

    /// Records matching `filter`, newest first.
    fn list(&self, workspace_id: &WorkspaceId, filter: &InventoryFilter) -> Result<Vec<Inventory>>;

    /// Delete a record and its movement history.
    fn delete(&self, workspace_id: &WorkspaceId, id: &InventoryId) -> Result<bool>;
}
