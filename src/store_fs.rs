//! Local-filesystem [`BlobStore`] backend.
//!
//! Maps store paths to files under a configured root directory. Used by
//! the CLI's local mode and the integration test-suite.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::BlobStore;

/// Blob store backed by a directory on the local filesystem.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Upload {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|e| Error::Upload {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn download_string(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(self.full_path(path))
            .await
            .map_err(|e| Error::Download {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let dir = self.full_path(prefix.trim_end_matches('/'));
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| Error::DirectoryDelete {
                path: prefix.to_string(),
                reason: e.to_string(),
            })
    }
}

impl LocalStore {
    /// Root directory this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        store.upload("7/proj/tags.csv", b"NO_LABEL").await.unwrap();
        assert_eq!(
            store.download_string("7/proj/tags.csv").await.unwrap(),
            "NO_LABEL"
        );
    }

    #[tokio::test]
    async fn delete_prefix_removes_the_project_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        store.upload("7/proj/a.txt", b"x").await.unwrap();
        store.upload("7/proj/b.txt", b"y").await.unwrap();
        store.delete_prefix("7/proj/").await.unwrap();
        assert!(store.download_string("7/proj/a.txt").await.is_err());
    }

    #[tokio::test]
    async fn delete_of_missing_directory_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let err = store.delete_prefix("7/ghost/").await.unwrap_err();
        assert!(matches!(err, Error::DirectoryDelete { .. }));
    }
}
