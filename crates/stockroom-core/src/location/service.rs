use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::{DomainError, Result};
use crate::hierarchy::ensure_acyclic;
use crate::ids::{LocationId, WorkspaceId};

use super::{CreateLocation, Location, LocationRepository, UpdateLocation};

/// Location use cases.
#[derive(Clone)]
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    fn ensure_short_code_free(&self, location: &Location) -> Result<()> {
        let Some(ref code) = location.short_code else {
            return Ok(());
        };
        match self.repo.find_by_short_code(&location.workspace_id, code)? {
            Some(other) if other.id != location.id => Err(DomainError::conflict(format!(
                "short code '{code}' is already used by another location"
            ))),
            _ => Ok(()),
        }
    }

    /// Create a location under an existing parent (or at the root).
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id))]
    pub fn create(&self, workspace_id: &WorkspaceId, params: &CreateLocation) -> Result<Location> {
        let location = Location::new(workspace_id.clone(), params)?;
        if let Some(ref parent) = location.parent_location_id {
            let _ = self.get(workspace_id, parent)?;
        }
        self.ensure_short_code_free(&location)?;
        self.repo.save(&location)?;
        info!(location_id = %location.id, "location created");
        Ok(location)
    }

    /// Fetch a location or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<Location> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("location", id))
    }

    /// All locations of a workspace.
    pub fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Location>> {
        self.repo.find_by_workspace(workspace_id)
    }

    /// Apply a partial update; re-parenting must not create a cycle.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, location_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &LocationId,
        params: &UpdateLocation,
    ) -> Result<Location> {
        let mut location = self.get(workspace_id, id)?;
        location.apply(params)?;
        if params.parent_location_id.is_some() {
            if let Some(ref parent) = location.parent_location_id {
                let _ = self.get(workspace_id, parent)?;
            }
            ensure_acyclic(
                "parent_location_id",
                id,
                location.parent_location_id.as_ref(),
                |current| {
                    Ok(self
                        .repo
                        .find_by_id(workspace_id, current)?
                        .and_then(|l| l.parent_location_id))
                },
            )?;
        }
        self.ensure_short_code_free(&location)?;
        self.repo.save(&location)?;
        Ok(location)
    }

    /// Delete an empty location.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, location_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &LocationId) -> Result<()> {
        let _ = self.get(workspace_id, id)?;
        let usage = self.repo.usage(workspace_id, id)?;
        if !usage.is_empty() {
            return Err(DomainError::conflict(format!(
                "location is in use ({} child locations, {} containers, {} inventory records)",
                usage.children, usage.containers, usage.inventory
            )));
        }
        let _ = self.repo.delete(workspace_id, id)?;
        info!("location deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationUsage, MockLocationRepository};
    use assert_matches::assert_matches;

    fn ws() -> WorkspaceId {
        WorkspaceId::from("ws-1")
    }

    fn garage() -> Location {
        Location::new(
            ws(),
            &CreateLocation {
                name: "Garage".into(),
                short_code: Some("GAR".into()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn duplicate_short_code_conflicts() {
        let other = garage();
        let mut repo = MockLocationRepository::new();
        let _ = repo
            .expect_find_by_short_code()
            .returning(move |_, _| Ok(Some(other.clone())));
        let _ = repo.expect_save().never();
        let service = LocationService::new(Arc::new(repo));

        let err = service
            .create(
                &ws(),
                &CreateLocation {
                    name: "Shed".into(),
                    short_code: Some("GAR".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_matches!(err, DomainError::Conflict(_));
    }

    #[test]
    fn update_keeps_own_short_code() {
        let loc = garage();
        let id = loc.id.clone();
        let found = loc.clone();
        let same = loc.clone();
        let mut repo = MockLocationRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(found.clone())));
        let _ = repo
            .expect_find_by_short_code()
            .returning(move |_, _| Ok(Some(same.clone())));
        let _ = repo.expect_save().times(1).returning(|_| Ok(()));
        let service = LocationService::new(Arc::new(repo));

        let updated = service
            .update(
                &ws(),
                &id,
                &UpdateLocation {
                    shelf: Some("A3".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.shelf.as_deref(), Some("A3"));
    }

    #[test]
    fn delete_in_use_conflicts() {
        let loc = garage();
        let id = loc.id.clone();
        let mut repo = MockLocationRepository::new();
        let _ = repo
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(loc.clone())));
        let _ = repo.expect_usage().returning(|_, _| {
            Ok(LocationUsage {
                containers: 2,
                ..Default::default()
            })
        });
        let _ = repo.expect_delete().never();
        let service = LocationService::new(Arc::new(repo));

        let err = service.delete(&ws(), &id).unwrap_err();
        assert_matches!(err, DomainError::Conflict(msg) if msg.contains("2 containers"));
    }
}
