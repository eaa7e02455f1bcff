//! Attachments: uploaded files or external document references linked to
//! items. At most one attachment per item is primary.

mod file;
mod repository;
mod service;

pub use file::{
    DEFAULT_MIME_TYPE, FileRepository, FileStorage, StoredFile, UploadFile, checksum, storage_key,
};
#[cfg(test)]
pub use file::{MockFileRepository, MockFileStorage};
pub use repository::AttachmentRepository;
#[cfg(test)]
pub use repository::MockAttachmentRepository;
pub use service::AttachmentService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::ids::{AttachmentId, FileId, ItemId, WorkspaceId};
use crate::validate;

const TITLE_MAX: usize = 200;
const EXTERNAL_REF_MAX: usize = 500;

string_enum! {
    /// What an attachment documents.
    #[derive(Default)]
    AttachmentType {
        /// Picture of the item.
        Photo => "PHOTO",
        /// User manual.
        Manual => "MANUAL",
        /// Proof of purchase.
        Receipt => "RECEIPT",
        /// Warranty certificate.
        Warranty => "WARRANTY",
        /// Anything else.
        #[default]
        Other => "OTHER",
    }
}

/// A file or external reference linked to an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: AttachmentId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Item the attachment belongs to.
    pub item_id: ItemId,
    /// Uploaded file, exclusive with `external_ref`.
    pub file_id: Option<FileId>,
    /// Opaque reference into an external document system.
    pub external_ref: Option<String>,
    /// Kind of document.
    pub attachment_type: AttachmentType,
    /// Optional title.
    pub title: Option<String>,
    /// Whether this is the item's main attachment.
    pub is_primary: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`AttachmentService::create`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateAttachment {
    /// Kind of document.
    #[serde(default)]
    pub attachment_type: AttachmentType,
    /// Uploaded file.
    pub file_id: Option<FileId>,
    /// External reference.
    pub external_ref: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Make this the item's primary attachment.
    #[serde(default)]
    pub is_primary: bool,
}

/// Partial update of title and type.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateAttachment {
    /// New kind.
    pub attachment_type: Option<AttachmentType>,
    /// New title (blank clears).
    pub title: Option<String>,
}

impl Attachment {
    /// Validate input and build a new attachment.
    pub fn new(workspace_id: WorkspaceId, item_id: ItemId, params: &CreateAttachment) -> Result<Self> {
        let external_ref = validate::optional(
            "external_ref",
            params.external_ref.as_deref(),
            EXTERNAL_REF_MAX,
        )?;
        match (&params.file_id, &external_ref) {
            (Some(_), Some(_)) => {
                return Err(DomainError::validation(
                    "file_id",
                    "give either file_id or external_ref, not both",
                ));
            }
            (None, None) => {
                return Err(DomainError::validation(
                    "file_id",
                    "one of file_id or external_ref is required",
                ));
            }
            _ => {}
        }
        let now = Utc::now();
        Ok(Self {
            id: AttachmentId::new(),
            workspace_id,
            item_id,
            file_id: params.file_id.clone(),
            external_ref,
            attachment_type: params.attachment_type,
            title: validate::optional("title", params.title.as_deref(), TITLE_MAX)?,
            is_primary: params.is_primary,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update.
    pub fn apply(&mut self, params: &UpdateAttachment) -> Result<()> {
        if let Some(kind) = params.attachment_type {
            self.attachment_type = kind;
        }
        validate::patch_optional(&mut self.title, "title", params.title.as_deref(), TITLE_MAX)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
