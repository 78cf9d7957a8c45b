//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the application layer
//! talks to the catalog service and to device storage.
//!
//! Implementations of these traits live in `adapters`.

mod catalog_api;
mod token_storage;

// Re-exports
pub use catalog_api::*;
pub use token_storage::*;
