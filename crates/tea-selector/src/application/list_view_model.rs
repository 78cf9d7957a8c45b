//! List View Model
//!
//! Screen state for the tea, tea type and owner management lists: the
//! fetched collection, create/delete with client-side validation, and
//! optimistic local updates kept in alphabetical order.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{Notice, ViewState};
use crate::domain::{sort_by_name, CatalogEntry, CatalogError, EntityId, Owner, Tea, TeaType};
use crate::ports::CatalogApi;

/// User-facing text for one kind of list
#[derive(Debug, Clone, Copy)]
pub struct KindMessages {
    pub label: &'static str,
    pub blank_name: &'static str,
    pub duplicate_name: &'static str,
    pub added: &'static str,
    pub deleted: &'static str,
    /// Shown when the server refuses a delete, usually because the record
    /// is still referenced elsewhere
    pub delete_refused: &'static str,
}

/// How a list screen reaches its entity on the catalog service
#[async_trait]
pub trait EntityKind: Send + Sync + 'static {
    type Entity: CatalogEntry + PartialEq + fmt::Debug;
    type Draft: Send + Sync;

    const MESSAGES: KindMessages;

    /// The name the new entity will carry
    fn draft_name(draft: &Self::Draft) -> &str;

    async fn fetch(api: &dyn CatalogApi) -> Result<Vec<Self::Entity>, CatalogError>;

    async fn create(
        api: &dyn CatalogApi,
        name: &str,
        draft: &Self::Draft,
    ) -> Result<Self::Entity, CatalogError>;

    async fn delete(api: &dyn CatalogApi, id: EntityId) -> Result<(), CatalogError>;
}

/// Teas list
pub struct Teas;

/// Tea types list
pub struct TeaTypes;

/// Owners list
pub struct Owners;

/// A tea waiting to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeaDraft {
    pub name: String,
    pub type_id: EntityId,
}

#[async_trait]
impl EntityKind for Teas {
    type Entity = Tea;
    type Draft = TeaDraft;

    const MESSAGES: KindMessages = KindMessages {
        label: "tea",
        blank_name: "Please enter a name for the new tea!",
        duplicate_name: "That tea already exists!",
        added: "Tea successfully added!",
        deleted: "Tea successfully deleted!",
        delete_refused: "Please check if anyone still owns this tea!",
    };

    fn draft_name(draft: &TeaDraft) -> &str {
        &draft.name
    }

    async fn fetch(api: &dyn CatalogApi) -> Result<Vec<Tea>, CatalogError> {
        api.list_teas().await
    }

    async fn create(
        api: &dyn CatalogApi,
        name: &str,
        draft: &TeaDraft,
    ) -> Result<Tea, CatalogError> {
        api.create_tea(name, draft.type_id).await
    }

    async fn delete(api: &dyn CatalogApi, id: EntityId) -> Result<(), CatalogError> {
        api.delete_tea(id).await
    }
}

#[async_trait]
impl EntityKind for TeaTypes {
    type Entity = TeaType;
    type Draft = String;

    const MESSAGES: KindMessages = KindMessages {
        label: "tea type",
        blank_name: "Please enter a name for the new type!",
        duplicate_name: "That type of tea already exists!",
        added: "Tea type successfully added!",
        deleted: "Tea type successfully deleted!",
        delete_refused: "Please check if there are any teas of this type!",
    };

    fn draft_name(draft: &String) -> &str {
        draft
    }

    async fn fetch(api: &dyn CatalogApi) -> Result<Vec<TeaType>, CatalogError> {
        api.list_types().await
    }

    async fn create(
        api: &dyn CatalogApi,
        name: &str,
        _draft: &String,
    ) -> Result<TeaType, CatalogError> {
        api.create_type(name).await
    }

    async fn delete(api: &dyn CatalogApi, id: EntityId) -> Result<(), CatalogError> {
        api.delete_type(id).await
    }
}

#[async_trait]
impl EntityKind for Owners {
    type Entity = Owner;
    type Draft = String;

    const MESSAGES: KindMessages = KindMessages {
        label: "owner",
        blank_name: "Please enter a name for the new owner!",
        duplicate_name: "An owner with that name already exists!",
        added: "Owner successfully added!",
        deleted: "Owner successfully deleted!",
        delete_refused: "Please check if they own any teas!",
    };

    fn draft_name(draft: &String) -> &str {
        draft
    }

    async fn fetch(api: &dyn CatalogApi) -> Result<Vec<Owner>, CatalogError> {
        api.list_owners().await
    }

    async fn create(
        api: &dyn CatalogApi,
        name: &str,
        _draft: &String,
    ) -> Result<Owner, CatalogError> {
        api.create_owner(name).await
    }

    async fn delete(api: &dyn CatalogApi, id: EntityId) -> Result<(), CatalogError> {
        api.delete_owner(id).await
    }
}

/// Immutable picture of a list screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSnapshot<E> {
    pub state: ViewState<Vec<E>>,
    /// A create or delete is in flight
    pub mutating: bool,
    pub notice: Option<Notice>,
}

impl<E> ListSnapshot<E> {
    pub fn items(&self) -> Option<&[E]> {
        self.state.loaded().map(Vec::as_slice)
    }
}

/// View model for one management list
pub struct ListViewModel<K: EntityKind, A: CatalogApi + 'static> {
    api: Arc<A>,
    state: ViewState<Vec<K::Entity>>,
    mutating: bool,
    notice: Option<Notice>,
    tx: watch::Sender<ListSnapshot<K::Entity>>,
}

pub type TeaListViewModel<A> = ListViewModel<Teas, A>;
pub type TeaTypeListViewModel<A> = ListViewModel<TeaTypes, A>;
pub type OwnerListViewModel<A> = ListViewModel<Owners, A>;

impl<K: EntityKind, A: CatalogApi + 'static> ListViewModel<K, A> {
    /// A freshly mounted screen, loading until the first `refresh`
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _) = watch::channel(ListSnapshot {
            state: ViewState::Loading,
            mutating: false,
            notice: None,
        });

        Self {
            api,
            state: ViewState::Loading,
            mutating: false,
            notice: None,
            tx,
        }
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<K::Entity>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<K::Entity> {
        ListSnapshot {
            state: self.state.clone(),
            mutating: self.mutating,
            notice: self.notice.clone(),
        }
    }

    pub fn items(&self) -> Option<&[K::Entity]> {
        self.state.loaded().map(Vec::as_slice)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    /// Re-fetch and replace the whole collection
    pub async fn refresh(&mut self) -> Result<(), CatalogError> {
        self.state = ViewState::Loading;
        self.publish();

        match K::fetch(self.api.as_ref()).await {
            Ok(mut items) => {
                sort_by_name(&mut items);
                debug!(kind = K::MESSAGES.label, count = items.len(), "List loaded");
                self.state = ViewState::Loaded(items);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(kind = K::MESSAGES.label, error = %e, "List fetch failed");
                self.state = ViewState::Failed(e.user_message());
                self.notice = Some(Notice::error(
                    format!("Error loading {}s", K::MESSAGES.label),
                    e.user_message(),
                ));
                self.publish();
                Err(e)
            }
        }
    }

    /// Validate, create on the server, then insert locally in name order.
    ///
    /// A blank or already-listed name is rejected before any request is sent.
    pub async fn create(&mut self, draft: K::Draft) -> Result<K::Entity, CatalogError> {
        let name = K::draft_name(&draft).trim().to_string();
        if let Err(e) = self.validate_name(&name) {
            self.notice = Some(Notice::error("Error", e.user_message()));
            self.publish();
            return Err(e);
        }

        self.mutating = true;
        self.publish();
        let result = K::create(self.api.as_ref(), &name, &draft).await;
        self.mutating = false;

        match result {
            Ok(entity) => {
                if let Some(items) = self.state.loaded_mut() {
                    items.retain(|e| e.id() != entity.id());
                    let pos = items.partition_point(|e| e.name() < entity.name());
                    items.insert(pos, entity.clone());
                }
                info!(kind = K::MESSAGES.label, id = entity.id(), name = %entity.name(), "Created");
                self.notice = Some(Notice::info(K::MESSAGES.added));
                self.publish();
                Ok(entity)
            }
            Err(e) => {
                warn!(kind = K::MESSAGES.label, error = %e, "Create failed");
                self.notice = Some(Notice::error(
                    format!("Error adding {}", K::MESSAGES.label),
                    e.user_message(),
                ));
                self.publish();
                Err(e)
            }
        }
    }

    /// Delete on the server; the local list only changes on success
    pub async fn delete(&mut self, id: EntityId) -> Result<(), CatalogError> {
        if self.state.loaded().is_none() {
            return Err(CatalogError::InvalidState(format!(
                "{} list is not loaded",
                K::MESSAGES.label
            )));
        }

        self.mutating = true;
        self.publish();
        let result = K::delete(self.api.as_ref(), id).await;
        self.mutating = false;

        match result {
            Ok(()) => {
                if let Some(items) = self.state.loaded_mut() {
                    items.retain(|e| e.id() != id);
                }
                info!(kind = K::MESSAGES.label, id, "Deleted");
                self.notice = Some(Notice::info(K::MESSAGES.deleted));
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(kind = K::MESSAGES.label, id, error = %e, "Delete failed");
                self.notice = Some(Notice::error(
                    format!("Error deleting {}", K::MESSAGES.label),
                    K::MESSAGES.delete_refused,
                ));
                self.publish();
                Err(e)
            }
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), CatalogError> {
        let items = self.items().ok_or_else(|| {
            CatalogError::InvalidState(format!("{} list is not loaded", K::MESSAGES.label))
        })?;

        if name.is_empty() {
            return Err(CatalogError::validation(K::MESSAGES.blank_name));
        }
        if items.iter().any(|e| e.name() == name) {
            return Err(CatalogError::validation(K::MESSAGES.duplicate_name));
        }
        Ok(())
    }
}
