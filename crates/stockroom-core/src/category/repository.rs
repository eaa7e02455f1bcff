use crate::errors::Result;
use crate::ids::{CategoryId, WorkspaceId};

use super::Category;

/// Persistence seam for categories.
#[cfg_attr(test, mockall::automock)]
pub trait CategoryRepository: Send + Sync {
    /// Insert or replace a category.
    fn save(&self, category: &Category) -> Result<()>;

    /// Look up a category inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<Option<Category>>;

    /// All categories of a workspace, ordered by name.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<Category>>;

    /// Whether any category names this one as parent.
    fn has_children(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<bool>;

    /// Delete a category. Returns whether a row was removed.
    fn delete(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<bool>;
}
