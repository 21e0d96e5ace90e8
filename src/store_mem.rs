//! In-memory [`BlobStore`] implementation for tests and ephemeral runs.
//!
//! Objects live in a `HashMap` behind `std::sync::RwLock`; operations
//! return immediately-ready futures.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::BlobStore;

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.objects
            .write()
            .expect("store lock poisoned")
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download_string(&self, path: &str) -> Result<String> {
        let objects = self.objects.read().expect("store lock poisoned");
        let bytes = objects.get(path).ok_or_else(|| Error::Download {
            path: path.to_string(),
            reason: "object not found".to_string(),
        })?;
        Ok(String::from_utf8_lossy(bytes).to_string())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let mut objects = self.objects.write().expect("store lock poisoned");
        let keys: Vec<String> = objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        if keys.is_empty() {
            return Err(Error::DirectoryDelete {
                path: prefix.to_string(),
                reason: "no objects under prefix".to_string(),
            });
        }
        for key in keys {
            objects.remove(&key);
        }
        Ok(())
    }
}
