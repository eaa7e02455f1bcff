//! Item categories, arranged as a tree.

mod repository;
mod service;

pub use repository::CategoryRepository;
#[cfg(test)]
pub use repository::MockCategoryRepository;
pub use service::CategoryService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{CategoryId, WorkspaceId};
use crate::patch::double_option;
use crate::validate;

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

/// Category used to group items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Parent category, `None` for roots.
    pub parent_category_id: Option<CategoryId>,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`CategoryService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateCategory {
    /// Display name.
    pub name: String,
    /// Optional parent.
    pub parent_category_id: Option<CategoryId>,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update. `parent_category_id: null` moves the category to the root.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCategory {
    /// New name.
    pub name: Option<String>,
    /// New parent (`Some(None)` clears it).
    #[serde(default, deserialize_with = "double_option")]
    pub parent_category_id: Option<Option<CategoryId>>,
    /// New description.
    pub description: Option<String>,
}

impl Category {
    /// Validate input and build a new category.
    pub fn new(workspace_id: WorkspaceId, params: &CreateCategory) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: CategoryId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            parent_category_id: params.parent_category_id.clone(),
            description: validate::optional(
                "description",
                params.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Ancestry checks happen in the service.
    pub fn apply(&mut self, params: &UpdateCategory) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if let Some(ref parent) = params.parent_category_id {
            if parent.as_ref() == Some(&self.id) {
                return Err(DomainError::validation(
                    "parent_category_id",
                    "a category cannot be its own parent",
                ));
            }
            self.parent_category_id = parent.clone();
        }
        if let Some(ref description) = params.description {
            self.description =
                validate::optional("description", Some(description), DESCRIPTION_MAX)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> Category {
        Category::new(
            WorkspaceId::from("ws-1"),
            &CreateCategory {
                name: "Tools".into(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn new_category() {
        let cat = category();
        assert_eq!(cat.name, "Tools");
        assert!(cat.parent_category_id.is_none());
    }

    #[test]
    fn name_required() {
        let err = Category::new(WorkspaceId::from("ws-1"), &CreateCategory::default());
        assert!(err.is_err());
    }

    #[test]
    fn cannot_parent_itself() {
        let mut cat = category();
        let own_id = cat.id.clone();
        let result = cat.apply(&UpdateCategory {
            parent_category_id: Some(Some(own_id)),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn null_parent_moves_to_root() {
        let mut cat = category();
        cat.parent_category_id = Some(CategoryId::from("cat-parent"));
        cat.apply(&UpdateCategory {
            parent_category_id: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert!(cat.parent_category_id.is_none());
    }
}
