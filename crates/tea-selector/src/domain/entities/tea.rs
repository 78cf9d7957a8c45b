//! Tea and TeaType

use serde::{Deserialize, Serialize};

use super::{CatalogEntry, EntityId};

/// A type of tea (green, oolong, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeaType {
    pub id: EntityId,
    pub name: String,
}

/// A tea in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tea {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub tea_type: TeaType,
}

impl TeaType {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Tea {
    pub fn new(id: EntityId, name: impl Into<String>, tea_type: TeaType) -> Self {
        Self {
            id,
            name: name.into(),
            tea_type,
        }
    }
}

impl CatalogEntry for TeaType {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntry for Tea {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tea_wire_shape() {
        let tea: Tea = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Sencha",
            "type": { "id": 1, "name": "Green" }
        }))
        .unwrap();

        assert_eq!(tea, Tea::new(3, "Sencha", TeaType::new(1, "Green")));

        let value = serde_json::to_value(&tea).unwrap();
        assert_eq!(value["type"]["name"], "Green");
        assert!(value.get("tea_type").is_none());
    }
}
