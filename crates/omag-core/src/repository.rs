use async_trait::async_trait;
use uuid::Uuid;

use crate::error::OmagError;
use crate::instances::{EntityDetail, NewEntity, NewRelationship, Relationship};

/// Filter for [`MetadataCollection::find_entities`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct EntityQuery {
    /// Exact type names to include (callers expand subtypes).
    pub type_names: Vec<String>,
    /// Exact match on one property value.
    pub property: Option<(String, serde_json::Value)>,
    pub anchor_guid: Option<Uuid>,
    pub external_source_guid: Option<Uuid>,
}

impl EntityQuery {
    pub fn of_types(type_names: Vec<String>) -> Self {
        Self {
            type_names,
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: &str, value: serde_json::Value) -> Self {
        self.property = Some((name.to_string(), value));
        self
    }

    pub fn with_anchor(mut self, anchor_guid: Uuid) -> Self {
        self.anchor_guid = Some(anchor_guid);
        self
    }

    pub fn with_external_source(mut self, external_source_guid: Uuid) -> Self {
        self.external_source_guid = Some(external_source_guid);
        self
    }

    /// In-process evaluation of the filter.
    pub fn matches(&self, entity: &EntityDetail) -> bool {
        if !self.type_names.is_empty() && !self.type_names.iter().any(|t| *t == entity.type_name)
        {
            return false;
        }
        if let Some((name, value)) = &self.property {
            if entity.properties.get(name) != Some(value) {
                return false;
            }
        }
        if let Some(anchor) = self.anchor_guid {
            if entity.anchor_guid != Some(anchor) {
                return false;
            }
        }
        if let Some(source) = self.external_source_guid {
            if entity.external_source.as_ref().map(|s| s.guid) != Some(source) {
                return false;
            }
        }
        true
    }
}

/// Stores the entities and relationships published through the access services.
///
/// Results of `find_entities` come back in creation order.
#[async_trait]
pub trait MetadataCollection: Send + Sync {
    async fn add_entity(&self, user_id: &str, entity: NewEntity)
    -> Result<EntityDetail, OmagError>;

    async fn get_entity(&self, guid: Uuid) -> Result<Option<EntityDetail>, OmagError>;

    /// Replace properties and classifications. Fails if the stored version differs
    /// from `entity.version`; returns the entity with its version incremented.
    async fn update_entity(
        &self,
        user_id: &str,
        entity: &EntityDetail,
    ) -> Result<EntityDetail, OmagError>;

    /// Remove an entity and every relationship attached to it.
    async fn delete_entity(&self, guid: Uuid) -> Result<(), OmagError>;

    async fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>, OmagError>;

    async fn add_relationship(
        &self,
        user_id: &str,
        relationship: NewRelationship,
    ) -> Result<Relationship, OmagError>;

    async fn get_relationship(&self, guid: Uuid) -> Result<Option<Relationship>, OmagError>;

    async fn update_relationship(
        &self,
        user_id: &str,
        relationship: &Relationship,
    ) -> Result<Relationship, OmagError>;

    async fn delete_relationship(&self, guid: Uuid) -> Result<(), OmagError>;

    /// Relationships with `entity_guid` at either end, optionally of one type.
    async fn get_relationships(
        &self,
        entity_guid: Uuid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>, OmagError>;

    async fn health_check(&self) -> Result<(), OmagError>;
}
