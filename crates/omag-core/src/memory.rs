//! In-memory metadata repository, used for `in_memory` local repositories and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::OmagError;
use crate::instances::{EntityDetail, NewEntity, NewRelationship, Relationship};
use crate::repository::{EntityQuery, MetadataCollection};

#[derive(Default)]
struct Store {
    sequence: u64,
    entities: HashMap<Uuid, (u64, EntityDetail)>,
    relationships: HashMap<Uuid, (u64, Relationship)>,
}

impl Store {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Cloning shares the underlying store.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>, OmagError> {
        self.store
            .read()
            .map_err(|_| OmagError::PropertyServer("in-memory repository lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>, OmagError> {
        self.store
            .write()
            .map_err(|_| OmagError::PropertyServer("in-memory repository lock poisoned".into()))
    }

    pub fn entity_count(&self) -> usize {
        self.read().map(|s| s.entities.len()).unwrap_or(0)
    }

    pub fn relationship_count(&self) -> usize {
        self.read().map(|s| s.relationships.len()).unwrap_or(0)
    }
}

#[async_trait]
impl MetadataCollection for InMemoryRepository {
    async fn add_entity(
        &self,
        user_id: &str,
        entity: NewEntity,
    ) -> Result<EntityDetail, OmagError> {
        let detail = EntityDetail {
            guid: Uuid::new_v4(),
            type_name: entity.type_name,
            version: 1,
            created_by: user_id.to_string(),
            create_time: Utc::now(),
            updated_by: None,
            update_time: None,
            external_source: entity.external_source,
            anchor_guid: entity.anchor_guid,
            properties: entity.properties,
            classifications: entity.classifications,
        };
        let mut store = self.write()?;
        let seq = store.next_sequence();
        store.entities.insert(detail.guid, (seq, detail.clone()));
        Ok(detail)
    }

    async fn get_entity(&self, guid: Uuid) -> Result<Option<EntityDetail>, OmagError> {
        Ok(self.read()?.entities.get(&guid).map(|(_, e)| e.clone()))
    }

    async fn update_entity(
        &self,
        user_id: &str,
        entity: &EntityDetail,
    ) -> Result<EntityDetail, OmagError> {
        let mut store = self.write()?;
        let (_, stored) = store
            .entities
            .get_mut(&entity.guid)
            .ok_or_else(|| OmagError::not_found("guid", entity.guid))?;

        if stored.version != entity.version {
            return Err(OmagError::PropertyServer(format!(
                "Entity {} was updated concurrently (version {} != {})",
                entity.guid, stored.version, entity.version
            )));
        }

        stored.properties = entity.properties.clone();
        stored.classifications = entity.classifications.clone();
        stored.version += 1;
        stored.updated_by = Some(user_id.to_string());
        stored.update_time = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_entity(&self, guid: Uuid) -> Result<(), OmagError> {
        let mut store = self.write()?;
        if store.entities.remove(&guid).is_none() {
            return Err(OmagError::not_found("guid", guid));
        }
        store
            .relationships
            .retain(|_, (_, r)| r.end1_guid != guid && r.end2_guid != guid);
        Ok(())
    }

    async fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>, OmagError> {
        let store = self.read()?;
        let mut matched: Vec<&(u64, EntityDetail)> = store
            .entities
            .values()
            .filter(|(_, e)| query.matches(e))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, e)| e.clone()).collect())
    }

    async fn add_relationship(
        &self,
        user_id: &str,
        relationship: NewRelationship,
    ) -> Result<Relationship, OmagError> {
        let mut store = self.write()?;
        for end in [relationship.end1_guid, relationship.end2_guid] {
            if !store.entities.contains_key(&end) {
                return Err(OmagError::not_found("guid", end));
            }
        }

        let stored = Relationship {
            guid: Uuid::new_v4(),
            type_name: relationship.type_name,
            version: 1,
            end1_guid: relationship.end1_guid,
            end2_guid: relationship.end2_guid,
            created_by: user_id.to_string(),
            create_time: Utc::now(),
            updated_by: None,
            update_time: None,
            external_source: relationship.external_source,
            properties: relationship.properties,
        };
        let seq = store.next_sequence();
        store.relationships.insert(stored.guid, (seq, stored.clone()));
        Ok(stored)
    }

    async fn get_relationship(&self, guid: Uuid) -> Result<Option<Relationship>, OmagError> {
        Ok(self.read()?.relationships.get(&guid).map(|(_, r)| r.clone()))
    }

    async fn update_relationship(
        &self,
        user_id: &str,
        relationship: &Relationship,
    ) -> Result<Relationship, OmagError> {
        let mut store = self.write()?;
        let (_, stored) = store
            .relationships
            .get_mut(&relationship.guid)
            .ok_or_else(|| OmagError::not_found("relationship_guid", relationship.guid))?;

        if stored.version != relationship.version {
            return Err(OmagError::PropertyServer(format!(
                "Relationship {} was updated concurrently",
                relationship.guid
            )));
        }

        stored.properties = relationship.properties.clone();
        stored.version += 1;
        stored.updated_by = Some(user_id.to_string());
        stored.update_time = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete_relationship(&self, guid: Uuid) -> Result<(), OmagError> {
        let mut store = self.write()?;
        store
            .relationships
            .remove(&guid)
            .map(|_| ())
            .ok_or_else(|| OmagError::not_found("relationship_guid", guid))
    }

    async fn get_relationships(
        &self,
        entity_guid: Uuid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>, OmagError> {
        let store = self.read()?;
        let mut matched: Vec<&(u64, Relationship)> = store
            .relationships
            .values()
            .filter(|(_, r)| r.end1_guid == entity_guid || r.end2_guid == entity_guid)
            .filter(|(_, r)| type_name.is_none_or(|t| r.type_name == t))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn health_check(&self) -> Result<(), OmagError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::{InstanceProperties, type_names};

    fn new_entity(type_name: &str, qualified_name: &str) -> NewEntity {
        let mut properties = InstanceProperties::new();
        properties.insert("qualifiedName".into(), serde_json::json!(qualified_name));
        NewEntity {
            type_name: type_name.into(),
            external_source: None,
            anchor_guid: None,
            properties,
            classifications: vec![],
        }
    }

    #[tokio::test]
    async fn test_find_returns_creation_order() {
        let repo = InMemoryRepository::new();
        for name in ["c", "a", "b"] {
            repo.add_entity("u", new_entity(type_names::DATABASE, name))
                .await
                .unwrap();
        }
        repo.add_entity("u", new_entity(type_names::DATABASE_TABLE, "t"))
            .await
            .unwrap();

        let found = repo
            .find_entities(&EntityQuery::of_types(vec![type_names::DATABASE.into()]))
            .await
            .unwrap();
        let names: Vec<_> = found.iter().filter_map(|e| e.qualified_name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let repo = InMemoryRepository::new();
        let entity = repo
            .add_entity("u", new_entity(type_names::DATABASE, "db"))
            .await
            .unwrap();

        let updated = repo.update_entity("v", &entity).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.updated_by.as_deref(), Some("v"));

        // Stale version is rejected
        let err = repo.update_entity("v", &entity).await.unwrap_err();
        assert!(matches!(err, OmagError::PropertyServer(_)));
    }

    #[tokio::test]
    async fn test_delete_entity_removes_relationships() {
        let repo = InMemoryRepository::new();
        let db = repo
            .add_entity("u", new_entity(type_names::DATABASE, "db"))
            .await
            .unwrap();
        let schema = repo
            .add_entity("u", new_entity(type_names::DATABASE_SCHEMA, "db.s"))
            .await
            .unwrap();
        repo.add_relationship(
            "u",
            NewRelationship {
                type_name: type_names::DATA_CONTENT_FOR_DATA_SET.into(),
                end1_guid: db.guid,
                end2_guid: schema.guid,
                external_source: None,
                properties: InstanceProperties::new(),
            },
        )
        .await
        .unwrap();
        assert_eq!(repo.relationship_count(), 1);

        repo.delete_entity(db.guid).await.unwrap();
        assert_eq!(repo.relationship_count(), 0);
        assert!(repo.get_entity(schema.guid).await.unwrap().is_some());
        assert!(repo.delete_entity(db.guid).await.is_err());
    }

    #[tokio::test]
    async fn test_relationship_requires_both_ends() {
        let repo = InMemoryRepository::new();
        let db = repo
            .add_entity("u", new_entity(type_names::DATABASE, "db"))
            .await
            .unwrap();
        let result = repo
            .add_relationship(
                "u",
                NewRelationship {
                    type_name: type_names::DATA_CONTENT_FOR_DATA_SET.into(),
                    end1_guid: db.guid,
                    end2_guid: Uuid::new_v4(),
                    external_source: None,
                    properties: InstanceProperties::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(OmagError::ElementNotFound { .. })));
    }
}
