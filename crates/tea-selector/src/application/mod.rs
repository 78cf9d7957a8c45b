//! Application Layer (View Models)
//!
//! Screen state for the home, management and account screens, plus the
//! session gate. Each view model owns the collection it fetched and
//! publishes immutable snapshots.

mod account_view_model;
mod home_view_model;
mod list_view_model;
mod ownership_view_model;
mod session;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use account_view_model::AccountViewModel;
pub use home_view_model::{HomeSnapshot, HomeView, HomeViewModel};
pub use list_view_model::{
    EntityKind, KindMessages, ListSnapshot, ListViewModel, OwnerListViewModel, Owners,
    TeaDraft, TeaListViewModel, TeaTypeListViewModel, TeaTypes, Teas,
};
pub use ownership_view_model::{OwnershipSnapshot, OwnershipViewModel};
pub use session::{SessionStore, SESSION_KEY};
pub use state::{Notice, NoticeLevel, ViewState};
