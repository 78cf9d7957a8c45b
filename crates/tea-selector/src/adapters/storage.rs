//! Token Storage Implementations
//!
//! A TOML key-value file for real devices and an in-memory map for tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::CatalogError;
use crate::ports::TokenStorage;

/// Key-value pairs stored in a single TOML file
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, CatalogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(CatalogError::Storage(format!(
                    "Failed to read {:?}: {e}",
                    self.path
                )))
            }
        };

        toml::from_str(&content)
            .map_err(|e| CatalogError::Storage(format!("Failed to parse {:?}: {e}", self.path)))
    }

    async fn save(&self, items: &BTreeMap<String, String>) -> Result<(), CatalogError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                CatalogError::Storage(format!("Failed to create directory {:?}: {e}", dir))
            })?;
        }

        let content = toml::to_string(items)
            .map_err(|e| CatalogError::Storage(format!("Failed to serialize storage: {e}")))?;

        // write-then-rename
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to write {:?}: {e}", tmp)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CatalogError::Storage(format!("Failed to replace {:?}: {e}", self.path)))?;

        debug!(path = ?self.path, entries = items.len(), "Token storage saved");
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CatalogError> {
        let mut items = self.load().await?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), CatalogError> {
        let mut items = self.load().await?;
        if items.remove(key).is_some() {
            self.save(&items).await?;
        }
        Ok(())
    }
}

/// Process-local storage; nothing survives a restart
#[derive(Default)]
pub struct MemoryTokenStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, CatalogError> {
        self.items
            .lock()
            .map_err(|_| CatalogError::Storage("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CatalogError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), CatalogError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
