//! Domain Entities
//!
//! Catalog records and the session credential.

mod owner;
mod ownership;
mod session;
mod tea;

pub use owner::*;
pub use ownership::*;
pub use session::*;
pub use tea::*;

/// Server-assigned identifier of a catalog record
pub type EntityId = i64;

/// A named catalog record (tea, tea type or owner)
pub trait CatalogEntry: Clone + Send + Sync + 'static {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
}

/// Sort entries alphabetically by name, the ordering every list screen uses
pub fn sort_by_name<T: CatalogEntry>(entries: &mut [T]) {
    entries.sort_by(|a, b| a.name().cmp(b.name()));
}
