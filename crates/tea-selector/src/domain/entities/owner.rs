//! Owner - someone who keeps teas in the catalog

use serde::{Deserialize, Serialize};

use super::{CatalogEntry, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub id: EntityId,
    pub name: String,
}

impl Owner {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl CatalogEntry for Owner {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
