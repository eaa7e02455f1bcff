//! People items are lent to.

mod repository;
mod service;

pub use repository::BorrowerRepository;
#[cfg(test)]
pub use repository::MockBorrowerRepository;
pub use service::BorrowerService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{BorrowerId, WorkspaceId};
use crate::validate;

const NAME_MAX: usize = 200;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 50;
const NOTES_MAX: usize = 2000;

/// A borrower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    /// Borrower ID.
    pub id: BorrowerId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`BorrowerService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateBorrower {
    /// Full name.
    pub name: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// Partial update. Blank strings clear optional fields.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateBorrower {
    /// Full name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

fn validate_email(email: Option<&str>) -> Result<Option<String>> {
    let Some(email) = validate::optional("email", email, EMAIL_MAX)? else {
        return Ok(None);
    };
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Some(email)),
        _ => Err(DomainError::validation("email", "is not a valid address")),
    }
}

impl Borrower {
    /// Validate input and build a new borrower.
    pub fn new(workspace_id: WorkspaceId, params: &CreateBorrower) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: BorrowerId::new(),
            workspace_id,
            name: validate::required("name", &params.name, NAME_MAX)?,
            email: validate_email(params.email.as_deref())?,
            phone: validate::optional("phone", params.phone.as_deref(), PHONE_MAX)?,
            notes: validate::optional("notes", params.notes.as_deref(), NOTES_MAX)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    pub fn apply(&mut self, params: &UpdateBorrower) -> Result<()> {
        if let Some(ref name) = params.name {
            self.name = validate::required("name", name, NAME_MAX)?;
        }
        if params.email.is_some() {
            self.email = validate_email(params.email.as_deref())?;
        }
        validate::patch_optional(&mut self.phone, "phone", params.phone.as_deref(), PHONE_MAX)?;
        validate::patch_optional(&mut self.notes, "notes", params.notes.as_deref(), NOTES_MAX)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_email(email: &str) -> Result<Borrower> {
        Borrower::new(
            WorkspaceId::from("ws-1"),
            &CreateBorrower {
                name: "Alex".into(),
                email: Some(email.into()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn email_rules() {
        assert!(with_email("alex@example.com").is_ok());
        assert!(with_email("a@b").is_ok());
        assert!(with_email("").unwrap().email.is_none());
        assert!(with_email("alex").is_err());
        assert!(with_email("@example.com").is_err());
        assert!(with_email("alex@").is_err());
    }

    #[test]
    fn apply_clears_phone() {
        let mut borrower = Borrower::new(
            WorkspaceId::from("ws-1"),
            &CreateBorrower {
                name: "Alex".into(),
                phone: Some("555-0100".into()),
                ..Default::default()
            },
        )
        .unwrap();
        borrower
            .apply(&UpdateBorrower {
                phone: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert!(borrower.phone.is_none());
    }
}
