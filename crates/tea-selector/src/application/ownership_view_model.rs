//! Ownership View Model
//!
//! One section per owner listing the teas they keep.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::list_view_model::ListSnapshot;
use super::state::{Notice, ViewState};
use crate::domain::{sort_by_name, CatalogError, EntityId, OwnerTeas, Tea};
use crate::ports::CatalogApi;

pub type OwnershipSnapshot = ListSnapshot<OwnerTeas>;

pub struct OwnershipViewModel<A: CatalogApi + 'static> {
    api: Arc<A>,
    state: ViewState<Vec<OwnerTeas>>,
    mutating: bool,
    notice: Option<Notice>,
    tx: watch::Sender<OwnershipSnapshot>,
}

impl<A: CatalogApi + 'static> OwnershipViewModel<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _) = watch::channel(OwnershipSnapshot {
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

    pub fn subscribe(&self) -> watch::Receiver<OwnershipSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> OwnershipSnapshot {
        OwnershipSnapshot {
            state: self.state.clone(),
            mutating: self.mutating,
            notice: self.notice.clone(),
        }
    }

    pub fn sections(&self) -> Option<&[OwnerTeas]> {
        self.state.loaded().map(Vec::as_slice)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn fail(&mut self, title: &str, message: String) {
        self.notice = Some(Notice::error(title, message));
        self.publish();
    }

    pub async fn refresh(&mut self) -> Result<(), CatalogError> {
        self.state = ViewState::Loading;
        self.publish();

        match self.api.list_ownerships().await {
            Ok(mut sections) => {
                sections.sort_by(|a, b| a.owner.name.cmp(&b.owner.name));
                for section in &mut sections {
                    sort_by_name(&mut section.teas);
                }
                self.state = ViewState::Loaded(sections);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Ownership fetch failed");
                self.state = ViewState::Failed(e.user_message());
                self.fail("Error loading owners' teas", e.user_message());
                Err(e)
            }
        }
    }

    /// Give `tea` to the owner. Rejected locally when the owner is unknown or
    /// already keeps a tea with that name.
    pub async fn add(&mut self, owner_id: EntityId, tea: &Tea) -> Result<Tea, CatalogError> {
        let check = match self.sections() {
            None => Err(CatalogError::InvalidState(
                "ownership list is not loaded".to_string(),
            )),
            Some(sections) => match sections.iter().find(|s| s.owner.id == owner_id) {
                None => Err(CatalogError::validation("That owner no longer exists!")),
                Some(section) if section.owns_named(&tea.name) => {
                    Err(CatalogError::validation("That tea already exists!"))
                }
                Some(_) => Ok(()),
            },
        };
        if let Err(e) = check {
            self.fail("Error", e.user_message());
            return Err(e);
        }

        self.mutating = true;
        self.publish();
        let result = self.api.add_ownership(tea.id, owner_id).await;
        self.mutating = false;

        match result {
            Ok(added) => {
                if let Some(section) = self
                    .state
                    .loaded_mut()
                    .and_then(|s| s.iter_mut().find(|s| s.owner.id == owner_id))
                {
                    let pos = section.teas.partition_point(|t| t.name < added.name);
                    section.teas.insert(pos, added.clone());
                }
                info!(owner_id, tea_id = added.id, "Ownership added");
                self.notice = Some(Notice::info("Tea successfully added!"));
                self.publish();
                Ok(added)
            }
            Err(e) => {
                warn!(owner_id, tea_id = tea.id, error = %e, "Adding ownership failed");
                self.fail("Error adding tea", e.user_message());
                Err(e)
            }
        }
    }

    /// Take a tea away from an owner; local sections change only on success
    pub async fn remove(&mut self, owner_id: EntityId, tea_id: EntityId) -> Result<(), CatalogError> {
        if self.sections().is_none() {
            return Err(CatalogError::InvalidState(
                "ownership list is not loaded".to_string(),
            ));
        }

        self.mutating = true;
        self.publish();
        let result = self.api.remove_ownership(tea_id, owner_id).await;
        self.mutating = false;

        match result {
            Ok(()) => {
                if let Some(section) = self
                    .state
                    .loaded_mut()
                    .and_then(|s| s.iter_mut().find(|s| s.owner.id == owner_id))
                {
                    section.teas.retain(|t| t.id != tea_id);
                }
                info!(owner_id, tea_id, "Ownership removed");
                self.notice = Some(Notice::info("Tea successfully deleted!"));
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!(owner_id, tea_id, error = %e, "Removing ownership failed");
                self.fail("Error deleting tea", e.user_message());
                Err(e)
            }
        }
    }
}
