use crate::errors::Result;
use crate::ids::{ItemId, LabelId, WorkspaceId};

use super::Label;

/// Persistence seam for labels and their item links.
#[cfg_attr(test, mockall::automock)]
pub trait LabelRepository: Send + Sync {
    /// Insert or replace a label.
    fn save(&self, label: &Label) -> Result<()>;

    /// Look up a label inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &LabelId) -> Result<Option<Label>>;

    /// Case-insensitive lookup by name.
    fn find_by_name(&self, workspace_id: &WorkspaceId, name: &str) -> Result<Option<Label>>;

    /// All labels of a workspace, ordered by name.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<Label>>;

    /// Labels attached to an item, ordered by name.
    fn find_by_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<Vec<Label>>;

    /// Link a label to an item. Returns `false` if the link already existed.
    fn attach(&self, workspace_id: &WorkspaceId, item_id: &ItemId, label_id: &LabelId)
        -> Result<bool>;

    /// Unlink a label from an item. Returns whether a link was removed.
    fn detach(&self, workspace_id: &WorkspaceId, item_id: &ItemId, label_id: &LabelId)
        -> Result<bool>;

    /// Delete a label and all of its item links.
    fn delete(&self, workspace_id: &WorkspaceId, id: &LabelId) -> Result<bool>;
}
