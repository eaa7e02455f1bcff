//! Workspaces: the tenant boundary.

mod repository;
mod service;

pub use repository::WorkspaceRepository;
#[cfg(test)]
pub use repository::MockWorkspaceRepository;
pub use service::WorkspaceService;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::WorkspaceId;
use crate::validate;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

const NAME_MAX: usize = 100;
const SLUG_MAX: usize = 64;
const DESCRIPTION_MAX: usize = 1000;

/// A tenant. Every other entity belongs to exactly one workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace ID.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// URL-safe unique handle.
    pub slug: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`WorkspaceService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateWorkspace {
    /// Display name.
    pub name: String,
    /// URL-safe handle, lowercase letters, digits and single dashes.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update; `None` leaves a field unchanged, a blank string clears it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateWorkspace {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

fn validate_slug(slug: &str) -> Result<String> {
    let slug = validate::required("slug", slug, SLUG_MAX)?;
    if !SLUG_RE.is_match(&slug) {
        return Err(DomainError::validation(
            "slug",
            "must be lowercase letters, digits and single dashes",
        ));
    }
    Ok(slug)
}

impl Workspace {
    /// Validate input and build a new workspace.
    pub fn new(params: &CreateWorkspace) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: WorkspaceId::new(),
            name: validate::required("name", &params.name, NAME_MAX)?,
            slug: validate_slug(&params.slug)?,
            description: validate::optional(
                "description",
                params.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    pub fn apply(&mut self, params: &UpdateWorkspace) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if let Some(ref description) = params.description {
            self.description =
                validate::optional("description", Some(description), DESCRIPTION_MAX)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
