use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::{DomainError, Result};
use crate::hierarchy::ensure_acyclic;
use crate::ids::{CategoryId, WorkspaceId};

use super::{Category, CategoryRepository, CreateCategory, UpdateCategory};

/// Category use cases.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a category, checking that the parent exists in the workspace.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateCategory) -> Result<Category> {
        let category = Category::new(workspace_id.clone(), params)?;
        if let Some(ref parent) = category.parent_category_id {
            let _ = self.get(workspace_id, parent)?;
        }
        self.repo.save(&category)?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// Fetch a category or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<Category> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    /// All categories of a workspace.
    pub fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Category>> {
        self.repo.find_by_workspace(workspace_id)
    }

    /// Apply a partial update; re-parenting must not create a cycle.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, category_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &CategoryId,
        params: &UpdateCategory,
    ) -> Result<Category> {
        let mut category = self.get(workspace_id, id)?;
        category.apply(params)?;
        if params.parent_category_id.is_some() {
            if let Some(ref parent) = category.parent_category_id {
                let _ = self.get(workspace_id, parent)?;
            }
            ensure_acyclic(
                "parent_category_id",
                id,
                category.parent_category_id.as_ref(),
                |current| {
                    Ok(self
                        .repo
                        .find_by_id(workspace_id, current)?
                        .and_then(|c| c.parent_category_id))
                },
            )?;
        }
        self.repo.save(&category)?;
        Ok(category)
    }

    /// Delete a leaf category.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, category_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &CategoryId) -> Result<()> {
        let _ = self.get(workspace_id, id)?;
        if self.repo.has_children(workspace_id, id)? {
            return Err(DomainError::conflict(
                "category has subcategories; delete or move them first",
            ));
        }
        let _ = self.repo.delete(workspace_id, id)?;
        info!("category deleted");
        Ok(())
    }
}
