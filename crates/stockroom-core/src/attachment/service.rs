use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::errors::{DomainError, Result};
use crate::ids::{AttachmentId, FileId, ItemId, WorkspaceId};
use crate::item::ItemRepository;

use super::{
    Attachment, AttachmentRepository, CreateAttachment, FileRepository, FileStorage, StoredFile,
    UpdateAttachment, UploadFile,
};

/// Attachment and file use cases.
#[derive(Clone)]
pub struct AttachmentService {
    repo: Arc<dyn AttachmentRepository>,
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn FileStorage>,
    items: Arc<dyn ItemRepository>,
}

impl AttachmentService {
    /// Create a service over the attachment, file and item repositories and
    /// a blob storage backend.
    pub fn new(
        repo: Arc<dyn AttachmentRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn FileStorage>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self {
            repo,
            files,
            storage,
            items,
        }
    }

    fn ensure_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<()> {
        if self.items.find_by_id(workspace_id, item_id)?.is_none() {
            return Err(DomainError::not_found("item", item_id));
        }
        Ok(())
    }

    /// Store uploaded bytes and record the file.
    #[instrument(skip(self, params, data), fields(workspace_id = %workspace_id, size = data.len()))]
    pub fn upload(
        &self,
        workspace_id: &WorkspaceId,
        params: &UploadFile,
        data: &[u8],
    ) -> Result<StoredFile> {
        let file = StoredFile::new(workspace_id.clone(), params, data)?;
        self.storage.put(&file.storage_key, data)?;
        if let Err(err) = self.files.save(&file) {
            if let Err(cleanup) = self.storage.delete(&file.storage_key) {
                warn!(key = %file.storage_key, error = %cleanup, "failed to remove orphaned blob");
            }
            return Err(err);
        }
        info!(file_id = %file.id, checksum = %file.checksum, "file uploaded");
        Ok(file)
    }

    /// File metadata or `NotFound`.
    pub fn get_file(&self, workspace_id: &WorkspaceId, id: &FileId) -> Result<StoredFile> {
        self.files
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("file", id))
    }

    /// File metadata together with its bytes.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, file_id = %id))]
    pub fn download(&self, workspace_id: &WorkspaceId, id: &FileId) -> Result<(StoredFile, Vec<u8>)> {
        let file = self.get_file(workspace_id, id)?;
        let data = self.storage.get(&file.storage_key)?;
        Ok((file, data))
    }

    /// Attach a file or external reference to an item.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, item_id = %item_id))]
    pub fn create(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
        params: &CreateAttachment,
    ) -> Result<Attachment> {
        let attachment = Attachment::new(workspace_id.clone(), item_id.clone(), params)?;
        self.ensure_item(workspace_id, item_id)?;
        if let Some(ref file_id) = attachment.file_id {
            let _ = self.get_file(workspace_id, file_id)?;
        }
        self.repo.save(&attachment)?;
        info!(
            attachment_id = %attachment.id,
            primary = attachment.is_primary,
            "attachment created"
        );
        Ok(attachment)
    }

    /// Fetch an attachment or fail with `NotFound`.
    pub fn get(&self, workspace_id: &WorkspaceId, id: &AttachmentId) -> Result<Attachment> {
        self.repo
            .find_by_id(workspace_id, id)?
            .ok_or_else(|| DomainError::not_found("attachment", id))
    }

    /// Attachments of an item, primary first.
    pub fn list_for_item(
        &self,
        workspace_id: &WorkspaceId,
        item_id: &ItemId,
    ) -> Result<Vec<Attachment>> {
        self.ensure_item(workspace_id, item_id)?;
        self.repo.find_by_item(workspace_id, item_id)
    }

    /// Update title and type.
    #[instrument(skip(self, params), fields(workspace_id = %workspace_id, attachment_id = %id))]
    pub fn update(
        &self,
        workspace_id: &WorkspaceId,
        id: &AttachmentId,
        params: &UpdateAttachment,
    ) -> Result<Attachment> {
        let mut attachment = self.get(workspace_id, id)?;
        attachment.apply(params)?;
        self.repo.save(&attachment)?;
        Ok(attachment)
    }

    /// Make an attachment its item's only primary attachment.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, attachment_id = %id))]
    pub fn set_primary(&self, workspace_id: &WorkspaceId, id: &AttachmentId) -> Result<Attachment> {
        let mut attachment = self.get(workspace_id, id)?;
        let now = Utc::now();
        if !self
            .repo
            .set_primary_for_item(workspace_id, &attachment.item_id, id, now)?
        {
            return Err(DomainError::not_found("attachment", id));
        }
        attachment.is_primary = true;
        attachment.updated_at = now;
        info!(item_id = %attachment.item_id, "primary attachment set");
        Ok(attachment)
    }

    /// Delete an attachment with its file record and stored bytes.
    ///
    /// Failing to remove the bytes is logged; the attachment is gone either way.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, attachment_id = %id))]
    pub fn delete(&self, workspace_id: &WorkspaceId, id: &AttachmentId) -> Result<Attachment> {
        let attachment = self.get(workspace_id, id)?;
        let _ = self.repo.delete(workspace_id, id)?;
        if let Some(ref file_id) = attachment.file_id {
            if let Some(file) = self.files.find_by_id(workspace_id, file_id)? {
                let _ = self.files.delete(workspace_id, file_id)?;
                if let Err(err) = self.storage.delete(&file.storage_key) {
                    warn!(key = %file.storage_key, error = %err, "failed to delete stored file");
                }
            }
        }
        info!("attachment deleted");
        Ok(attachment)
    }

    /// Delete every attachment of an item, each with its file and bytes.
    /// Run before deleting the item, whose row cascade would orphan them.
    #[instrument(skip(self), fields(workspace_id = %workspace_id, item_id = %item_id))]
    pub fn delete_for_item(&self, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<usize> {
        let attachments = self.repo.find_by_item(workspace_id, item_id)?;
        for attachment in &attachments {
            let _ = self.delete(workspace_id, &attachment.id)?;
        }
        Ok(attachments.len())
    }

    /// Every file record of a workspace, attached or not.
    pub fn workspace_files(&self, workspace_id: &WorkspaceId) -> Result<Vec<StoredFile>> {
        self.files.find_by_workspace(workspace_id)
    }

    /// Remove stored bytes for files whose records are already gone.
    pub fn remove_blobs(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(err) = self.storage.delete(&file.storage_key) {
                warn!(key = %file.storage_key, error = %err, "failed to delete stored file");
            }
        }
        if !files.is_empty() {
            info!(count = files.len(), "stored files removed");
        }
    }
}
