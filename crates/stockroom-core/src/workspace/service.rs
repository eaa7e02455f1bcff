use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::{DomainError, Result};
use crate::ids::WorkspaceId;

use super::{CreateWorkspace, UpdateWorkspace, Workspace, WorkspaceRepository};

/// Workspace use cases.
#[derive(Clone)]
pub struct WorkspaceService {
    repo: Arc<dyn WorkspaceRepository>,
}

impl WorkspaceService {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<dyn WorkspaceRepository>) -> Self {
        Self { repo }
    }

    /// Create a workspace. Slugs are unique.
    #[instrument(skip(self, params), fields(slug = %params.slug))]
    pub fn create(&self, params: &CreateWorkspace) -> Result<Workspace> {
        let workspace = Workspace::new(params)?;
        if self.repo.find_by_slug(&workspace.slug)?.is_some() {
            return Err(DomainError::conflict(format!(
                "workspace slug '{}' is already taken",
                workspace.slug
            )));
        }
        self.repo.save(&workspace)?;
        info!(workspace_id = %workspace.id, "workspace created");
        Ok(workspace)
    }

    /// Fetch a workspace or fail with `NotFound`.
    pub fn get(&self, id: &WorkspaceId) -> Result<Workspace> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("workspace", id))
    }

    /// All workspaces.
    pub fn list(&self) -> Result<Vec<Workspace>> {
        self.repo.list()
    }

    /// Apply a partial update.
    #[instrument(skip(self, params), fields(workspace_id = %id))]
    pub fn update(&self, id: &WorkspaceId, params: &UpdateWorkspace) -> Result<Workspace> {
        let mut workspace = self.get(id)?;
        workspace.apply(params)?;
        self.repo.save(&workspace)?;
        Ok(workspace)
    }

    /// Delete a workspace and all of its contents.
    #[instrument(skip(self), fields(workspace_id = %id))]
    pub fn delete(&self, id: &WorkspaceId) -> Result<()> {
        if !self.repo.delete(id)? {
            return Err(DomainError::not_found("workspace", id));
        }
        info!("workspace deleted");
        Ok(())
    }
}
