use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::category::CategoryRepository;
use crate::errors::{DomainError, Result};
use crate::ids::{CategoryId, ItemId, WorkspaceId};
use crate::pagination::{Page, PageRequest};

use super::{CreateItem, Item, ItemFilter, ItemRepository, LowStockItem, UpdateItem};

/// Item use cases.
#[derive(Clone)]
pub struct ItemService {
    repo: Arc<dyn ItemRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ItemService {
    /// Create a service over the item and category repositories.
    pub fn new(repo: Arc<dyn ItemRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { repo, categories }
    }

    fn ensure_category(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<()> {
        if self.categories.find_by_id(workspace_id, id)?.is_none() {
            return Err(DomainError::not_found("category", id));
        }
        Ok(())
    }

    fn ensure_sku_free(&self, item: &Item) -> Result<()> {
        match self.repo.find_by_sku(&item.workspace_id, &item.sku)? {
            Some(other) if other.id != item.id => Err(DomainError::conflict(format!(
                "sku '{}' is already used by another item",
                item.sku
            ))),
            _ => Ok(()),
        }
    }

    /// Create an item.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, sku = %params.sku))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateItem) -> Result<Item> {
        let item = Item::new(workspace_id.clone(), params)?;
        if let Some(ref category_id) = item.category_id {
            self.ensure_category(workspace_id, category_id)?;
        }
        self.ensure_sku_free(&item)?;
        self.repo.save(&item)?;
        info!(item_id = %item.id, "item created");
        Ok(item)
    }

    /// Fetch an item or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<Item> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("item", id))
    }

    /// One page of items.
    pub fn list(
        &self,
        workspace_id: &WorkspaceId,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<Page<Item>> {
        let page = self.repo.list(workspace_id, filter, page)?;
        debug!(total = page.total, returned = page.items.len(), "items listed");
        Ok(page)
    }

    /// Apply a partial update.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, item_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        params: &UpdateItem,
    ) -> Result<Item> {
        let mut item = self.get(workspace_id, id)?;
        item.apply(params)?;
        if let Some(Some(ref category_id)) = params.category_id {
            self.ensure_category(workspace_id, category_id)?;
        }
        if params.sku.is_some() {
            self.ensure_sku_free(&item)?;
        }
        self.repo.save(&item)?;
        Ok(item)
    }

    /// Hide an item from default listings. Idempotent.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %id))]
    pub fn archive(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<Item> {
        self.set_archived(workspace_id, id, true)
    }

    /// Undo [`ItemService::archive`]. Idempotent.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %id))]
    pub fn restore(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<Item> {
        self.set_archived(workspace_id, id, false)
    }

    fn set_archived(&self, workspace_id: &WorkspaceId, id: &ItemId, archived: bool) -> Result<Item> {
        let mut item = self.get(workspace_id, id)?;
        if item.is_archived != archived {
            item.is_archived = archived;
            item.updated_at = chrono::Utc::now();
            self.repo.save(&item)?;
            info!(archived, "item archive flag changed");
        }
        Ok(item)
    }

    /// Items whose stock has fallen below their reorder threshold.
    pub fn low_stock(&self, workspace_id: &WorkspaceId) -> Result<Vec<LowStockItem>> {
        self.repo.low_stock(workspace_id)
    }

    /// Delete an item. Inventory, attachment rows and label links cascade;
    /// attached files are removed separately with
    /// [`AttachmentService::delete_for_item`](crate::attachment::AttachmentService::delete_for_item).
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<()> {
        if !self.repo.delete(workspace_id, id)? {
            return Err(DomainError::not_found("item", id));
        }
        info!("item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::MockCategoryRepository;
    use crate::item::MockItemRepository;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    fn ws() -> WorkspaceId {
        WorkspaceId::from("ws-1")
    }

    fn params() -> CreateItem {
        CreateItem {
            name: "Hammer".into(),
            sku: "HAM-1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_rejects_duplicate_sku() {
        let existing = Item::new(ws(), &params()).unwrap();
        let mut repo = MockItemRepository::new();
        let _ = repo
            .expect_find_by_sku()
            .returning(move |_, _| Ok(Some(existing.clone())));
        let _ = repo.expect_save().never();
        let service = ItemService::new(Arc::new(repo), Arc::new(MockCategoryRepository::new()));

        let err = service.create(&ws(), &params()).unwrap_err();
        assert_matches!(err, DomainError::Conflict(_));
    }

    #[test]
    fn create_checks_category() {
        let mut repo = MockItemRepository::new();
        let _ = repo.expect_save().never();
        let mut categories = MockCategoryRepository::new();
        let _ = categories.expect_find_by_id().returning(|_, _| Ok(None));
        let service = ItemService::new(Arc::new(repo), Arc::new(categories));

        let err = service
            .create(
                &ws(),
                &CreateItem {
                    category_id: Some(CategoryId::from("cat-x")),
                    ..params()
                },
            )
            .unwrap_err();
        assert_matches!(err, DomainError::NotFound { entity: "category", .. });
    }

    #[test]
    fn archive_twice_saves_once() {
        let item = Item::new(ws(), &params()).unwrap();
        let id = item.id.clone();
        let stored = Arc::new(Mutex::new(item));
        let reader = Arc::clone(&stored);
        let writer = Arc::clone(&stored);
        let mut repo = MockItemRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(reader.lock().unwrap().clone())));
        let _ = repo.expect_save().times(1).returning(move |i| {
            *writer.lock().unwrap() = i.clone();
            Ok(())
        });
        let service = ItemService::new(Arc::new(repo), Arc::new(MockCategoryRepository::new()));

        assert!(service.archive(&ws(), &id).unwrap().is_archived);
        assert!(service.archive(&ws(), &id).unwrap().is_archived);
    }

    #[test]
    fn delete_missing_is_not_found() {
        let mut repo = MockItemRepository::new();
        let _ = repo.expect_delete().returning(|_, _| Ok(false));
        let service = ItemService::new(Arc::new(repo), Arc::new(MockCategoryRepository::new()));

        let err = service.delete(&ws(), &ItemId::from("item-x")).unwrap_err();
        assert_matches!(err, DomainError::NotFound { entity: "item", .. });
    }
}
