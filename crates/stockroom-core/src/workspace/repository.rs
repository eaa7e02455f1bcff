use crate::errors::Result;
use crate::ids::WorkspaceId;

use super::Workspace;

/// Persistence seam for workspaces.
#[cfg_attr(test, mockall::automock)]
pub trait WorkspaceRepository: Send + Sync {
    /// Insert or replace a workspace.
    fn save(&self, workspace: &Workspace) -> Result<()>;

    /// Look up a workspace by ID.
    fn find_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>>;

    /// Look up a workspace by its slug.
    fn find_by_slug(&self, slug: &str) -> Result<Option<Workspace>>;

    /// All workspaces, newest first.
    fn list(&self) -> Result<Vec<Workspace>>;

    /// Delete a workspace and everything in it. Returns whether a row was removed.
    fn delete(&self, id: &WorkspaceId) -> Result<bool>;
}
