//! Token Storage Port
//!
//! Device-local key-value storage for the session token.

use async_trait::async_trait;

use crate::domain::CatalogError;

/// String key-value store persisted on the device
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), CatalogError>;

    async fn remove_item(&self, key: &str) -> Result<(), CatalogError>;
}
