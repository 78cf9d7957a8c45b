//! Tea Selector Client Library
//!
//! Client core for the Tea Selector: talks to the tea catalog service,
//! keeps the login session on the device and holds the state behind each
//! screen (home picker, tea/type/owner management, ownership, account).
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure entities and logic
//!   - `entities/`: Tea, TeaType, Owner, ownership groupings, Session
//!   - `services/`: Random selection and the owner filter
//!   - `errors/`: `CatalogError`
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `CatalogApi`: the remote catalog service
//!   - `TokenStorage`: persistent key/value storage for the token
//!
//! - **Adapters** (`adapters/`): reqwest client, file and memory storage
//!
//! - **Application** (`application/`): session gate and view models
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tea_selector::{ClientConfig, HomeViewModel, RemoteCatalogClient, SelectionEngine};
//!
//! let client = RemoteCatalogClient::new(ClientConfig::new("http://localhost:7344"))?;
//! let mut home = HomeViewModel::new(Arc::new(client), SelectionEngine::new());
//! home.load().await?;
//! println!("{:?}", home.selected());
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use adapters::{ClientConfig, FileTokenStorage, MemoryTokenStorage, RemoteCatalogClient};
pub use application::{
    AccountViewModel, HomeSnapshot, HomeView, HomeViewModel, ListSnapshot, Notice, NoticeLevel,
    OwnerListViewModel, OwnershipViewModel, SessionStore, TeaDraft, TeaListViewModel,
    TeaTypeListViewModel, ViewState,
};
pub use domain::{
    CatalogEntry, CatalogError, EntityId, Owner, OwnerTeas, SelectionEngine, SelectionState,
    Session, Tea, TeaOwners, TeaType, TypeTeas,
};
pub use ports::{CatalogApi, TokenStorage};
