use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::ids::{AttachmentId, ItemId, WorkspaceId};

use super::Attachment;

/// Persistence seam for attachments.
#[cfg_attr(test, mockall::automock)]
pub trait AttachmentRepository: Send + Sync {
    /// Insert or replace an attachment. When `attachment.is_primary` is set,
    /// every other attachment of the item is unset in the same transaction.
    fn save(&self, attachment: &Attachment) -> Result<()>;

    /// Look up an attachment inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &AttachmentId)
        -> Result<Option<Attachment>>;

    /// Attachments of an item, primary first, then oldest first.
    fn find_by_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId)
        -> Result<Vec<Attachment>>;

    /// Atomically make `id` the only primary attachment of `item_id`,
    /// stamping every changed row with `at`.
    /// Returns `false` if the attachment does not belong to the item.
    fn set_primary_for_item(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
        id: &AttachmentId,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Delete an attachment. Returns whether a row was removed.
    fn delete(&self, workspace_id: &WorkspaceId, id: &AttachmentId) -> Result<bool>;
}
