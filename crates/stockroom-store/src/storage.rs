//! Blob storage on the local filesystem.
//!
//! Keys are relative paths (`{workspace}/{file}.bin`). Writes go to a
//! temporary sibling first and are renamed into place, so a crashed upload
//! never leaves a truncated blob under a live key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use stockroom_core::DomainError;
use stockroom_core::attachment::FileStorage;
use tracing::debug;

use crate::errors::{Result, StoreError};

/// [`FileStorage`] rooted at a directory.
#[derive(Clone, Debug)]
pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    /// Use `root` as the storage directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn put_inner(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = data.len(), "blob stored");
        Ok(())
    }

    fn delete_inner(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.resolve(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FileStorage for FilesystemStorage {
    fn put(&self, key: &str, data: &[u8]) -> stockroom_core::Result<()> {
        self.put_inner(key, data).map_err(DomainError::from)
    }

    fn get(&self, key: &str) -> stockroom_core::Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DomainError::not_found("file content", key))
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    fn delete(&self, key: &str) -> stockroom_core::Result<()> {
        self.delete_inner(key).map_err(DomainError::from)
    }

    fn exists(&self, key: &str) -> stockroom_core::Result<bool> {
        Ok(self.resolve(key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn storage() -> (tempfile::TempDir, FilesystemStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path().join("blobs")).unwrap();
        (dir, storage)
    }

    #[test]
    fn put_get_delete() {
        let (_dir, storage) = storage();
        storage.put("ws-1/file-1.bin", b"hello").unwrap();
        assert!(storage.exists("ws-1/file-1.bin").unwrap());
        assert_eq!(storage.get("ws-1/file-1.bin").unwrap(), b"hello");
        assert!(!storage.root().join("ws-1/file-1.tmp").exists());

        storage.delete("ws-1/file-1.bin").unwrap();
        assert!(!storage.exists("ws-1/file-1.bin").unwrap());
        storage.delete("ws-1/file-1.bin").unwrap();
    }

    #[test]
    fn missing_blob_is_not_found() {
        let (_dir, storage) = storage();
        assert_matches!(
            storage.get("ws-1/none.bin"),
            Err(DomainError::NotFound { entity: "file content", .. })
        );
    }

    #[test]
    fn keys_cannot_escape_root() {
        let (_dir, storage) = storage();
        for key in ["", "../x.bin", "/etc/passwd", "ws/../../x.bin", "./x.bin"] {
            assert_matches!(storage.put(key, b"x"), Err(DomainError::Storage(_)), "{key}");
        }
    }
}
