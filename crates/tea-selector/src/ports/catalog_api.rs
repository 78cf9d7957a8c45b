//! Catalog API Port
//!
//! Abstract interface to the remote tea catalog service.

use async_trait::async_trait;

use crate::domain::{
    CatalogError, EntityId, Owner, OwnerTeas, Session, Tea, TeaOwners, TeaType, TypeTeas,
};

/// Remote catalog operations.
///
/// Calls are never retried. Create calls are not idempotent: repeating one
/// after an ambiguous failure can create a duplicate.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_teas(&self) -> Result<Vec<Tea>, CatalogError>;

    async fn list_types(&self) -> Result<Vec<TeaType>, CatalogError>;

    async fn list_owners(&self) -> Result<Vec<Owner>, CatalogError>;

    /// Teas grouped per owner
    async fn list_ownerships(&self) -> Result<Vec<OwnerTeas>, CatalogError>;

    /// Teas grouped per type
    async fn list_types_with_teas(&self) -> Result<Vec<TypeTeas>, CatalogError>;

    /// Owners grouped per tea
    async fn list_teas_with_owners(&self) -> Result<Vec<TeaOwners>, CatalogError>;

    async fn create_tea(&self, name: &str, type_id: EntityId) -> Result<Tea, CatalogError>;

    async fn delete_tea(&self, id: EntityId) -> Result<(), CatalogError>;

    async fn create_type(&self, name: &str) -> Result<TeaType, CatalogError>;

    async fn delete_type(&self, id: EntityId) -> Result<(), CatalogError>;

    async fn create_owner(&self, name: &str) -> Result<Owner, CatalogError>;

    async fn delete_owner(&self, id: EntityId) -> Result<(), CatalogError>;

    /// Record that `owner_id` owns `tea_id`; returns the tea
    async fn add_ownership(&self, tea_id: EntityId, owner_id: EntityId)
        -> Result<Tea, CatalogError>;

    async fn remove_ownership(
        &self,
        tea_id: EntityId,
        owner_id: EntityId,
    ) -> Result<(), CatalogError>;

    async fn login(&self, username: &str, password: &str) -> Result<Session, CatalogError>;

    async fn change_password(&self, old: &str, new: &str) -> Result<(), CatalogError>;

    /// Lightweight authenticated request carrying `session`'s token.
    /// `Ok` means the server accepted it.
    async fn verify_session(&self, session: &Session) -> Result<(), CatalogError>;
}
