//! Local persistence backends
//!
//! The cache only needs string get/set under a namespace key, the same shape
//! as a browser's `localStorage`. The trait is async so that disk or remote
//! key-value stores can be plugged in without changing callers.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Key-value persistence for serialized cache envelopes
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the raw value stored under `key`
    async fn set_item(&self, key: &str, value: String) -> Result<()>;
}

/// In-process storage, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a raw value (e.g. to simulate an existing or corrupt cache)
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(key.into(), value.into());
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per storage key
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on first write
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File that holds the value for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let path = self.path_for(key);
        tokio::fs::write(&path, value).await?;
        debug!("Persisted storage key '{}' to {:?}", key, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get_item("k").await.unwrap().is_none());

        storage.set_item("k", "v1".to_string()).await.unwrap();
        storage.set_item("k", "v2".to_string()).await.unwrap();

        assert_eq!(storage.get_item("k").await.unwrap(), Some("v2".to_string()));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::with_item("seed", "{}");
        let clone = storage.clone();

        clone.set_item("other", "x".to_string()).await.unwrap();
        assert_eq!(storage.len().await, 2);
    }

    #[test]
    fn test_file_storage_path_sanitizes_key() {
        let storage = FileStorage::new("/tmp/cache");
        assert_eq!(
            storage.path_for("TranslateManager"),
            PathBuf::from("/tmp/cache/TranslateManager.json")
        );
        assert_eq!(
            storage.path_for("../app/i18n"),
            PathBuf::from("/tmp/cache/___app_i18n.json")
        );
    }

    #[tokio::test]
    async fn test_file_storage_creates_directory_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert!(storage.get_item("key").await.unwrap().is_none());
        assert!(!storage.base_dir().exists());

        storage.set_item("key", "{\"time\":1}".to_string()).await.unwrap();
        assert_eq!(
            storage.get_item("key").await.unwrap(),
            Some("{\"time\":1}".to_string())
        );
    }
}
