//! Repository instance model: entities, relationships and classifications as the
//! metadata repository stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property bag keyed by open-metadata property names (e.g. `qualifiedName`).
pub type InstanceProperties = serde_json::Map<String, serde_json::Value>;

pub mod type_names {
    pub const SOFTWARE_SERVER_CAPABILITY: &str = "SoftwareServerCapability";
    pub const DATABASE_MANAGER: &str = "DatabaseManager";
    pub const DATABASE: &str = "Database";
    pub const DATABASE_SCHEMA: &str = "DeployedDatabaseSchema";
    pub const DATABASE_TABLE: &str = "RelationalTable";
    pub const DATABASE_VIEW: &str = "RelationalView";
    pub const DATABASE_COLUMN: &str = "RelationalColumn";

    pub const DATA_CONTENT_FOR_DATA_SET: &str = "DataContentForDataSet";
    pub const ATTRIBUTE_FOR_SCHEMA: &str = "AttributeForSchema";
    pub const NESTED_SCHEMA_ATTRIBUTE: &str = "NestedSchemaAttribute";
    pub const FOREIGN_KEY: &str = "ForeignKey";

    pub const PRIMARY_KEY: &str = "PrimaryKey";
}

/// Supertype of each known subtype.
const SUPERTYPES: &[(&str, &str)] = &[
    (
        type_names::DATABASE_MANAGER,
        type_names::SOFTWARE_SERVER_CAPABILITY,
    ),
    (type_names::DATABASE_VIEW, type_names::DATABASE_TABLE),
];

/// True when `type_name` is `super_type` or one of its subtypes.
pub fn is_type_of(type_name: &str, super_type: &str) -> bool {
    if type_name == super_type {
        return true;
    }
    SUPERTYPES
        .iter()
        .filter(|(sub, _)| *sub == type_name)
        .any(|(_, parent)| is_type_of(parent, super_type))
}

/// `super_type` together with all of its known subtypes.
pub fn type_family(super_type: &str) -> Vec<String> {
    let mut family = vec![super_type.to_string()];
    for (sub, _) in SUPERTYPES {
        if *sub != super_type && is_type_of(sub, super_type) {
            family.push(sub.to_string());
        }
    }
    family
}

/// The integration daemon that owns an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSource {
    pub guid: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    #[serde(default)]
    pub properties: InstanceProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub guid: Uuid,
    pub type_name: String,
    pub version: i64,
    pub created_by: String,
    pub create_time: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub update_time: Option<DateTime<Utc>>,
    pub external_source: Option<ExternalSource>,
    /// The asset this element belongs to, for elements that are not assets themselves.
    pub anchor_guid: Option<Uuid>,
    pub properties: InstanceProperties,
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl EntityDetail {
    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }

    /// Add or replace a classification.
    pub fn set_classification(&mut self, classification: Classification) {
        self.classifications.retain(|c| c.name != classification.name);
        self.classifications.push(classification);
    }

    /// Returns true if a classification was removed.
    pub fn remove_classification(&mut self, name: &str) -> bool {
        let before = self.classifications.len();
        self.classifications.retain(|c| c.name != name);
        before != self.classifications.len()
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.string_property("qualifiedName")
    }
}

/// An entity not yet stored.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub type_name: String,
    pub external_source: Option<ExternalSource>,
    pub anchor_guid: Option<Uuid>,
    pub properties: InstanceProperties,
    pub classifications: Vec<Classification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub guid: Uuid,
    pub type_name: String,
    pub version: i64,
    pub end1_guid: Uuid,
    pub end2_guid: Uuid,
    pub created_by: String,
    pub create_time: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub update_time: Option<DateTime<Utc>>,
    pub external_source: Option<ExternalSource>,
    #[serde(default)]
    pub properties: InstanceProperties,
}

impl Relationship {
    /// The guid at the other end from `guid`.
    pub fn other_end(&self, guid: Uuid) -> Uuid {
        if self.end1_guid == guid {
            self.end2_guid
        } else {
            self.end1_guid
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRelationship {
    pub type_name: String,
    pub end1_guid: Uuid,
    pub end2_guid: Uuid,
    pub external_source: Option<ExternalSource>,
    pub properties: InstanceProperties,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_hierarchy() {
        assert!(is_type_of(
            type_names::DATABASE_MANAGER,
            type_names::SOFTWARE_SERVER_CAPABILITY
        ));
        assert!(is_type_of(type_names::DATABASE_VIEW, type_names::DATABASE_TABLE));
        assert!(is_type_of(type_names::DATABASE, type_names::DATABASE));
        assert!(!is_type_of(type_names::DATABASE_TABLE, type_names::DATABASE_VIEW));
        assert!(!is_type_of(type_names::DATABASE, type_names::DATABASE_TABLE));
    }

    #[test]
    fn test_type_family() {
        let family = type_family(type_names::DATABASE_TABLE);
        assert_eq!(family, vec!["RelationalTable", "RelationalView"]);
        assert_eq!(type_family(type_names::DATABASE), vec!["Database"]);
    }

    #[test]
    fn test_classification_replace_and_remove() {
        let mut entity = EntityDetail {
            guid: Uuid::new_v4(),
            type_name: type_names::DATABASE_COLUMN.into(),
            version: 1,
            created_by: "erinoverview".into(),
            create_time: Utc::now(),
            updated_by: None,
            update_time: None,
            external_source: None,
            anchor_guid: None,
            properties: InstanceProperties::new(),
            classifications: vec![],
        };
        let mut props = InstanceProperties::new();
        props.insert("name".into(), serde_json::json!("pk_a"));
        entity.set_classification(Classification {
            name: type_names::PRIMARY_KEY.into(),
            properties: InstanceProperties::new(),
        });
        entity.set_classification(Classification {
            name: type_names::PRIMARY_KEY.into(),
            properties: props,
        });
        assert_eq!(entity.classifications.len(), 1);
        assert!(
            entity
                .classification(type_names::PRIMARY_KEY)
                .unwrap()
                .properties
                .contains_key("name")
        );
        assert!(entity.remove_classification(type_names::PRIMARY_KEY));
        assert!(!entity.remove_classification(type_names::PRIMARY_KEY));
    }
}
