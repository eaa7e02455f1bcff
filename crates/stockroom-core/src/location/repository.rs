use crate::errors::Result;
use crate::ids::{LocationId, WorkspaceId};

use super::Location;

/// What still references a location; any non-zero count blocks deletion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocationUsage {
    /// Direct child locations.
    pub children: u64,
    /// Containers placed at the location.
    pub containers: u64,
    /// Inventory records stored at the location.
    pub inventory: u64,
}

impl LocationUsage {
    /// Whether nothing references the location.
    pub fn is_empty(&self) -> bool {
        self.children == 0 && self.containers == 0 && self.inventory == 0
    }
}

/// Persistence seam for locations.
#[cfg_attr(test, mockall::automock)]
pub trait LocationRepository: Send + Sync {
    /// Insert or replace a location.
    fn save(&self, location: &Location) -> Result<()>;

    /// Look up a location inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<Option<Location>>;

    /// Look up a location by its short code.
    fn find_by_short_code(
        &self,
        workspace_id: &WorkspaceId,
        short_code: &str,
    ) -> Result<Option<Location>>;

    /// All locations of a workspace, ordered by name.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<Location>>;

    /// Count what references the location.
    fn usage(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<LocationUsage>;

    /// Delete a location. Returns whether a row was removed.
    fn delete(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<bool>;
}
