//! Uploaded file metadata and the blob storage seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{DomainError, Result};
use crate::ids::{FileId, WorkspaceId};
use crate::validate;

const NAME_MAX: usize = 255;
const MIME_MAX: usize = 100;

/// Fallback MIME type when the client sends none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Metadata of an uploaded file. The bytes live in [`FileStorage`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    /// File ID.
    pub id: FileId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Name the client uploaded the file under.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Lowercase hex SHA-256 of the content.
    pub checksum: String,
    /// Key of the blob in storage.
    pub storage_key: String,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// Upload metadata supplied alongside the bytes.
#[derive(Clone, Debug, Default)]
pub struct UploadFile {
    /// Client-side file name.
    pub original_name: String,
    /// MIME type, if the client sent one.
    pub mime_type: Option<String>,
}

/// Lowercase hex SHA-256 of `data`.
pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Storage key for a file: one directory per workspace.
pub fn storage_key(workspace_id: &WorkspaceId, id: &FileId) -> String {
    format!("{workspace_id}/{id}.bin")
}

impl StoredFile {
    /// Validate metadata and describe `data` as a new file.
    pub fn new(workspace_id: WorkspaceId, params: &UploadFile, data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(DomainError::validation("file", "must not be empty"));
        }
        let original_name = validate::required("original_name", &params.original_name, NAME_MAX)?;
        if original_name.contains(['/', '\\']) {
            return Err(DomainError::validation(
                "original_name",
                "must not contain path separators",
            ));
        }
        let mime_type = validate::optional("mime_type", params.mime_type.as_deref(), MIME_MAX)?
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let size_bytes = i64::try_from(data.len())
            .map_err(|_| DomainError::validation("file", "is too large"))?;
        let id = FileId::new();
        Ok(Self {
            storage_key: storage_key(&workspace_id, &id),
            id,
            workspace_id,
            original_name,
            mime_type,
            size_bytes,
            checksum: checksum(data),
            created_at: Utc::now(),
        })
    }
}

/// Persistence seam for file metadata.
#[cfg_attr(test, mockall::automock)]
pub trait FileRepository: Send + Sync {
    /// Insert a file record.
    fn save(&self, file: &StoredFile) -> Result<()>;

    /// Look up a file inside a workspace.
    fn find_by_id(&self, workspace_id: &WorkspaceId, id: &FileId) -> Result<Option<StoredFile>>;

    /// Every file record of a workspace.
    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> Result<Vec<StoredFile>>;

    /// Delete a file record. Returns whether a row was removed.
    fn delete(&self, workspace_id: &WorkspaceId, id: &FileId) -> Result<bool>;
}

/// Blob storage for file contents, addressed by storage key.
#[cfg_attr(test, mockall::automock)]
pub trait FileStorage: Send + Sync {
    /// Write a blob, replacing any existing one.
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Read a whole blob.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove a blob. Missing blobs are not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool>;
}
