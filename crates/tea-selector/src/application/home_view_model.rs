//! Home View Model
//!
//! Fetches the catalog and picks a tea at random, optionally restricted to
//! teas every checked owner keeps.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::{Notice, ViewState};
use crate::domain::{
    CatalogError, EntityId, Owner, OwnerTeas, SelectionEngine, SelectionState, Tea,
};
use crate::ports::CatalogApi;

/// Everything the home screen shows once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub selected: Option<Tea>,
    pub candidate_count: usize,
    /// Filter checkboxes, in owner name order
    pub owners: Vec<(Owner, bool)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeSnapshot {
    pub state: ViewState<HomeView>,
    pub notice: Option<Notice>,
}

struct HomeData {
    catalog: Vec<Tea>,
    ownerships: Vec<OwnerTeas>,
    selection: SelectionState,
}

pub struct HomeViewModel<A: CatalogApi + 'static> {
    api: Arc<A>,
    engine: SelectionEngine,
    state: ViewState<HomeData>,
    notice: Option<Notice>,
    tx: watch::Sender<HomeSnapshot>,
}

impl<A: CatalogApi + 'static> HomeViewModel<A> {
    pub fn new(api: Arc<A>, engine: SelectionEngine) -> Self {
        let (tx, _) = watch::channel(HomeSnapshot {
            state: ViewState::Loading,
            notice: None,
        });

        Self {
            api,
            engine,
            state: ViewState::Loading,
            notice: None,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> HomeSnapshot {
        let state = match &self.state {
            ViewState::Loading => ViewState::Loading,
            ViewState::Failed(message) => ViewState::Failed(message.clone()),
            ViewState::Loaded(data) => {
                let mut owners: Vec<(Owner, bool)> = data
                    .ownerships
                    .iter()
                    .map(|o| (o.owner.clone(), data.selection.filter().contains(&o.owner.id)))
                    .collect();
                owners.sort_by(|a, b| a.0.name.cmp(&b.0.name));

                ViewState::Loaded(HomeView {
                    selected: data.selection.selected().cloned(),
                    candidate_count: data.selection.candidates().len(),
                    owners,
                })
            }
        };

        HomeSnapshot {
            state,
            notice: self.notice.clone(),
        }
    }

    /// The currently picked tea
    pub fn selected(&self) -> Option<&Tea> {
        self.state.loaded().and_then(|d| d.selection.selected())
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.state.loaded().map(|d| &d.selection)
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    /// Fetch teas and who owns them, then pick straight away.
    ///
    /// Owner filters survive a reload as long as the owner still exists.
    pub async fn load(&mut self) -> Result<(), CatalogError> {
        let previous_filter = self
            .selection()
            .map(|s| s.filter().clone())
            .unwrap_or_default();

        self.state = ViewState::Loading;
        self.publish();

        let fetched = async {
            let catalog = self.api.list_teas().await?;
            let ownerships = self.api.list_ownerships().await?;
            Ok::<_, CatalogError>((catalog, ownerships))
        }
        .await;

        let (catalog, ownerships) = match fetched {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Home screen fetch failed");
                self.state = ViewState::Failed(e.user_message());
                self.notice = Some(Notice::error("Error loading teas", e.user_message()));
                self.publish();
                return Err(e);
            }
        };

        let mut selection = SelectionState::new();
        for owner_id in previous_filter {
            if ownerships.iter().any(|o| o.owner.id == owner_id) {
                selection.toggle_owner(owner_id);
            }
        }
        debug!(teas = catalog.len(), owners = ownerships.len(), "Home screen loaded");

        self.state = ViewState::Loaded(HomeData {
            catalog,
            ownerships,
            selection,
        });
        self.recompute();
        self.publish();
        Ok(())
    }

    /// Check or uncheck an owner and pick again from the new candidates
    pub fn toggle_owner(&mut self, owner_id: EntityId) -> Result<bool, CatalogError> {
        let data = self
            .state
            .loaded_mut()
            .ok_or_else(|| CatalogError::InvalidState("teas are not loaded".to_string()))?;
        let checked = data.selection.toggle_owner(owner_id);
        self.recompute();
        self.publish();
        Ok(checked)
    }

    /// Pick again from the current candidates
    pub fn pick_another(&mut self) -> Result<&Tea, CatalogError> {
        let data = self
            .state
            .loaded_mut()
            .ok_or_else(|| CatalogError::InvalidState("teas are not loaded".to_string()))?;

        match self.engine.pick(data.selection.candidates()) {
            Ok(index) => {
                data.selection.select(index)?;
                self.notice = None;
            }
            Err(e) => {
                self.notice = Some(Notice::error("No tea to select", e.user_message()));
                self.publish();
                return Err(e);
            }
        }

        self.publish();
        self.selected()
            .ok_or_else(|| CatalogError::InvalidState("selection vanished".to_string()))
    }

    /// Filter from scratch and pick; an empty result leaves nothing selected
    fn recompute(&mut self) {
        let Some(data) = self.state.loaded_mut() else {
            return;
        };

        let candidates = SelectionEngine::filter_by_owners(
            &data.ownerships,
            data.selection.filter(),
            &data.catalog,
        );
        data.selection.set_candidates(candidates);

        match self.engine.pick(data.selection.candidates()) {
            Ok(index) => {
                // index comes from pick over these very candidates
                let _ = data.selection.select(index);
                self.notice = None;
            }
            Err(_) => {
                let message = if data.selection.filter().is_empty() {
                    "There are no teas yet. Add some from the manage screen."
                } else {
                    "No tea is owned by all of the selected owners."
                };
                self.notice = Some(Notice::info(message));
            }
        }
    }
}
