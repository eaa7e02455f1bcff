//! Free-form labels attached to items.

mod repository;
mod service;

pub use repository::LabelRepository;
#[cfg(test)]
pub use repository::MockLabelRepository;
pub use service::LabelService;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{LabelId, WorkspaceId};
use crate::validate;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

/// A label. Names are unique per workspace, ignoring case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID.
    pub id: LabelId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// `#RRGGBB` color.
    pub color: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`LabelService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateLabel {
    /// Display name.
    pub name: String,
    /// Color.
    pub color: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Partial update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateLabel {
    /// Display name.
    pub name: Option<String>,
    /// Color (blank clears).
    pub color: Option<String>,
    /// Description (blank clears).
    pub description: Option<String>,
}

fn validate_color(color: Option<&str>) -> Result<Option<String>> {
    let Some(color) = validate::optional("color", color, 7)? else {
        return Ok(None);
    };
    if !COLOR_RE.is_match(&color) {
        return Err(DomainError::validation("color", "must look like #RRGGBB"));
    }
    Ok(Some(color.to_ascii_uppercase()))
}

impl Label {
    /// Validate input and build a new label.
    pub fn new(workspace_id: WorkspaceId, params: &CreateLabel) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: LabelId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            color: validate_color(params.color.as_deref())?,
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
    pub fn apply(&mut self, params: &UpdateLabel) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if params.color.is_some() {
            self.color = validate_color(params.color.as_deref())?;
        }
        validate::patch_optional(
            &mut self.description,
            "description",
            params.description.as_deref(),
            DESCRIPTION_MAX,
        )?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
