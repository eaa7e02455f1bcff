use crate::errors::Result;
use crate::ids::{ItemId, WorkspaceId};
use crate::pagination::{Page, PageRequest};

use super::{Item, ItemFilter, LowStockItem};

/// Persistence seam for items.
#[cfg_attr(test, mockall::automock)]
pub trait ItemRepository: Send + Sync {
    /// Insert or replace an item.
    fn save(&self, item: &Item) -> Result<()>;

    /// Look up an item inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<Option<Item>>;

    /// Look up an item by SKU.
    fn find_by_sku(&self, workspace_id: &WorkspaceId, sku: &str) -> Result<Option<Item>>;

    /// One page of items matching `filter`, ordered by name.
    fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Page<Item>>;

    /// Non-archived items whose total stock is below their `min_stock_level`.
    fn low_stock(&self, workspace_id: &WorkspaceId) -> Result<Vec<LowStockItem>>;

    /// Delete an item with its inventory, attachments and label links.
    fn delete(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<bool>;
}
