//! Storage locations (rooms, shelves, bins), arranged as a tree.

mod repository;
mod service;

pub use repository::{LocationRepository, LocationUsage};
#[cfg(test)]
pub use repository::MockLocationRepository;
pub use service::LocationService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{LocationId, WorkspaceId};
use crate::patch::double_option;
use crate::validate;

const NAME_MAX: usize = 100;
const PART_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 1000;

/// A physical place where inventory is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location ID.
    pub id: LocationId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Enclosing location, `None` for roots.
    pub parent_location_id: Option<LocationId>,
    /// Zone within a building.
    pub zone: Option<String>,
    /// Shelf label.
    pub shelf: Option<String>,
    /// Bin label.
    pub bin: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Short code printed on labels, unique per workspace.
    pub short_code: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`LocationService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateLocation {
    /// Display name.
    pub name: String,
    /// Enclosing location.
    pub parent_location_id: Option<LocationId>,
    /// Zone.
    pub zone: Option<String>,
    /// Shelf.
    pub shelf: Option<String>,
    /// Bin.
    pub bin: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Short code.
    pub short_code: Option<String>,
}

/// Partial update. Blank strings clear text fields.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateLocation {
    /// Display name.
    pub name: Option<String>,
    /// Enclosing location.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_location_id: Option<Option<LocationId>>,
    /// Zone.
    pub zone: Option<String>,
    /// Shelf.
    pub shelf: Option<String>,
    /// Bin.
    pub bin: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Short code.
    pub short_code: Option<String>,
}

impl Location {
    /// Validate input and build a new location.
    pub fn new(workspace_id: WorkspaceId, params: &CreateLocation) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: LocationId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            parent_location_id: params.parent_location_id.clone(),
            zone: validate::optional("zone", params.zone.as_deref(), PART_MAX)?,
            shelf: validate::optional("shelf", params.shelf.as_deref(), PART_MAX)?,
            bin: validate::optional("bin", params.bin.as_deref(), PART_MAX)?,
            description: validate::optional(
                "description",
                params.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            short_code: validate::short_code(params.short_code.as_deref())?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Ancestry checks happen in the service.
    pub fn apply(&mut self, params: &UpdateLocation) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if let Some(ref parent) = params.parent_location_id {
            if parent.as_ref() == Some(&self.id) {
                return Err(DomainError::validation(
                    "parent_location_id",
                    "a location cannot be its own parent",
                ));
            }
            self.parent_location_id = parent.clone();
        }
        validate::patch_optional(&mut self.zone, "zone", params.zone.as_deref(), PART_MAX)?;
        validate::patch_optional(&mut self.shelf, "shelf", params.shelf.as_deref(), PART_MAX)?;
        validate::patch_optional(&mut self.bin, "bin", params.bin.as_deref(), PART_MAX)?;
        validate::patch_optional(
            &mut self.description,
            "description",
            params.description.as_deref(),
            DESCRIPTION_MAX,
        )?;
        if let Some(ref code) = params.short_code {
            self.short_code = validate::short_code(Some(code))?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
