//! Ownership - the many-to-many relation between owners and teas
//!
//! The catalog service groups the relation three ways: per owner, per tea
//! and per tea type. `null` lists decode as empty.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Owner, Tea, TeaType};

/// All teas kept by a single owner, in server order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerTeas {
    pub owner: Owner,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teas: Vec<Tea>,
}

/// All owners of a single tea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaOwners {
    pub tea: Tea,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owners: Vec<Owner>,
}

/// All teas of a single type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTeas {
    #[serde(rename = "type")]
    pub tea_type: TeaType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teas: Vec<Tea>,
}

impl OwnerTeas {
    pub fn new(owner: Owner, teas: Vec<Tea>) -> Self {
        Self { owner, teas }
    }

    /// Whether this owner already keeps a tea with the given name
    pub fn owns_named(&self, name: &str) -> bool {
        self.teas.iter().any(|t| t.name == name)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_teas_decode_as_empty() {
        let parsed: Vec<OwnerTeas> = serde_json::from_str(
            r#"[
                {"owner": {"id": 1, "name": "Alice"}, "teas": null},
                {"owner": {"id": 2, "name": "Bob"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|o| o.teas.is_empty()));
    }

    #[test]
    fn test_type_teas_wire_shape() {
        let parsed: TypeTeas = serde_json::from_value(serde_json::json!({
            "type": {"id": 1, "name": "Green"},
            "teas": [{"id": 7, "name": "Sencha", "type": {"id": 1, "name": "Green"}}]
        }))
        .unwrap();

        assert_eq!(parsed.tea_type.name, "Green");
        assert_eq!(parsed.teas[0].name, "Sencha");
    }

    #[test]
    fn test_owns_named() {
        let green = TeaType::new(1, "Green");
        let owner = OwnerTeas::new(Owner::new(1, "Alice"), vec![Tea::new(1, "Sencha", green)]);

        assert!(owner.owns_named("Sencha"));
        assert!(!owner.owns_named("sencha"));
    }
}
