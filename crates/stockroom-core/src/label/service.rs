use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::errors::{DomainError, Result};
use crate::ids::{ItemId, LabelId, WorkspaceId};
use crate::item::ItemRepository;

use super::{CreateLabel, Label, LabelRepository, UpdateLabel};

/// Label use cases.
#[derive(Clone)]
pub struct LabelService {
    repo: Arc<dyn LabelRepository>,
    items: Arc<dyn ItemRepository>,
}

impl LabelService {
    /// Create a service over the label and item repositories.
    pub fn new(repo: Arc<dyn LabelRepository>, items: Arc<dyn ItemRepository>) -> Self {
        Self { repo, items }
    }

    fn ensure_name_free(&self, label: &Label) -> Result<()> {
        match self.repo.find_by_name(&label.workspace_id, &label.name)? {
            Some(other) if other.id != label.id => Err(DomainError::conflict(format!(
                "label '{}' already exists",
                other.name
            ))),
            _ => Ok(()),
        }
    }

    fn ensure_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<()> {
        if self.items.find_by_id(workspace_id, item_id)?.is_none() {
            return Err(DomainError::not_found("item", item_id));
        }
        Ok(())
    }

    /// Create a label.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateLabel) -> Result<Label> {
        let label = Label::new(workspace_id.clone(), params)?;
        self.ensure_name_free(&label)?;
        self.repo.save(&label)?;
        info!(label_id = %label.id, "label created");
        Ok(label)
    }

    /// Fetch a label or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &LabelId) -> Result<Label> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("label", id))
    }

    /// All labels of a workspace.
    pub fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Label>> {
        self.repo.find_by_workspace(workspace_id)
    }

    /// Apply a partial update.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, label_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &LabelId,
        params: &UpdateLabel,
    ) -> Result<Label> {
        let mut label = self.get(workspace_id, id)?;
        label.apply(params)?;
        if params.name.is_some() {
            self.ensure_name_free(&label)?;
        }
        self.repo.save(&label)?;
        Ok(label)
    }

    /// Delete a label; it disappears from every item.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, label_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &LabelId) -> Result<()> {
        if !self.repo.delete(workspace_id, id)? {
            return Err(DomainError::not_found("label", id));
        }
        info!("label deleted");
        Ok(())
    }

    /// Attach a label to an item. Attaching twice is a no-op.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %item_id, label_id = %label_id))]
    pub fn attach(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
        label_id: &LabelId,
    ) -> Result<Label> {
        self.ensure_item(workspace_id, item_id)?;
        let label = self.get(workspace_id, label_id)?;
        if self.repo.attach(workspace_id, item_id, label_id)? {
            info!("label attached");
        } else {
            debug!("label already attached");
        }
        Ok(label)
    }

    /// Detach a label from an item.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %item_id, label_id = %label_id))]
    pub fn detach(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
        label_id: &LabelId,
    ) -> Result<()> {
        self.ensure_item(workspace_id, item_id)?;
        let _ = self.get(workspace_id, label_id)?;
        if !self.repo.detach(workspace_id, item_id, label_id)? {
            return Err(DomainError::not_found("item label", label_id));
        }
        info!("label detached");
        Ok(())
    }

    /// Labels attached to an item.
    pub fn list_for_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<Vec<Label>> {
        self.ensure_item(workspace_id, item_id)?;
        self.repo.find_by_item(workspace_id, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{CreateItem, Item, MockItemRepository};
    use crate::label::MockLabelRepository;
    use assert_matches::assert_matches;

    fn ws() -> WorkspaceId {
        WorkspaceId::from("ws-1")
    }

    fn fragile() -> Label {
        Label::new(
            ws(),
            &CreateLabel {
                name: "Fragile".into(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn items_with_one() -> MockItemRepository {
        let item = Item::new(
            ws(),
            &CreateItem {
                name: "Vase".into(),
                sku: "VASE".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let mut items = MockItemRepository::new();
        let _ = items
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(item.clone())));
        items
    }

    #[test]
    fn duplicate_name_conflicts() {
        let existing = fragile();
        let mut repo = MockLabelRepository::new();
        let _ = repo
            .expect_find_by_name()
            .returning(move |_, _| Ok(Some(existing.clone())));
        let _ = repo.expect_save().never();
        let service = LabelService::new(Arc::new(repo), Arc::new(MockItemRepository::new()));

        let err = service
            .create(
                &ws(),
                &CreateLabel {
                    name: "fragile".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_matches!(err, DomainError::Conflict(_));
    }

    #[test]
    fn attach_is_idempotent() {
        let label = fragile();
        let label_id = label.id.clone();
        let mut repo = MockLabelRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(label.clone())));
        let mut calls = 0;
        let _ = repo.expect_attach().times(2).returning(move |_, _, _| {
            calls += 1;
            Ok(calls == 1)
        });
        let service = LabelService::new(Arc::new(repo), Arc::new(items_with_one()));

        let item_id = ItemId::from("item-1");
        assert!(service.attach(&ws(), &item_id, &label_id).is_ok());
        assert!(service.attach(&ws(), &item_id, &label_id).is_ok());
    }

    #[test]
    fn detach_unlinked_is_not_found() {
        let label = fragile();
        let label_id = label.id.clone();
        let mut repo = MockLabelRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(label.clone())));
        let _ = repo.expect_detach().returning(|_, _, _| Ok(false));
        let service = LabelService::new(Arc::new(repo), Arc::new(items_with_one()));

        let err = service
            .detach(&ws(), &ItemId::from("item-1"), &label_id)
            .unwrap_err();
        assert_matches!(err, DomainError::NotFound { .. });
    }
}
