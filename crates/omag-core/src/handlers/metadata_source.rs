use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::converters::{ElementProperties, QUALIFIED_NAME, to_element};
use crate::elements::DatabaseManagerElement;
use crate::error::OmagError;
use crate::instances::{
    EntityDetail, ExternalSource, NewEntity, is_type_of, type_family, type_names,
};
use crate::models::DatabaseManagerProperties;
use crate::repository::{EntityQuery, MetadataCollection};
use crate::validation::{validate_guid, validate_name, validate_user_id};

/// Registers integration daemons as software server capabilities and resolves the
/// external source named on later requests.
#[derive(Clone)]
pub struct MetadataSourceHandler {
    repository: Arc<dyn MetadataCollection>,
}

impl MetadataSourceHandler {
    pub fn new(repository: Arc<dyn MetadataCollection>) -> Self {
        Self { repository }
    }

    async fn find_by_qualified_name(
        &self,
        qualified_name: &str,
    ) -> Result<Option<EntityDetail>, OmagError> {
        let query = EntityQuery::of_types(type_family(type_names::SOFTWARE_SERVER_CAPABILITY))
            .with_property(QUALIFIED_NAME, Value::from(qualified_name));
        Ok(self.repository.find_entities(&query).await?.into_iter().next())
    }

    pub async fn create_database_manager(
        &self,
        user_id: &str,
        properties: &DatabaseManagerProperties,
    ) -> Result<Uuid, OmagError> {
        validate_user_id(user_id)?;
        validate_name(&properties.qualified_name, "qualified_name")?;
        if self
            .find_by_qualified_name(&properties.qualified_name)
            .await?
            .is_some()
        {
            return Err(OmagError::invalid_parameter(
                "qualified_name",
                format!(
                    "a metadata source named '{}' is already registered",
                    properties.qualified_name
                ),
            ));
        }

        let entity = self
            .repository
            .add_entity(
                user_id,
                NewEntity {
                    type_name: DatabaseManagerProperties::TYPE_NAME.to_string(),
                    external_source: None,
                    anchor_guid: None,
                    properties: properties.to_instance_properties(),
                    classifications: Vec::new(),
                },
            )
            .await?;
        tracing::info!(
            guid = %entity.guid,
            qualified_name = %properties.qualified_name,
            "Database manager registered"
        );
        Ok(entity.guid)
    }

    pub async fn get_metadata_source_guid(
        &self,
        user_id: &str,
        qualified_name: &str,
    ) -> Result<Uuid, OmagError> {
        validate_user_id(user_id)?;
        validate_name(qualified_name, "qualified_name")?;
        self.find_by_qualified_name(qualified_name)
            .await?
            .map(|e| e.guid)
            .ok_or_else(|| {
                OmagError::invalid_parameter(
                    "qualified_name",
                    format!("no metadata source is registered as '{qualified_name}'"),
                )
            })
    }

    pub async fn get_database_manager(
        &self,
        user_id: &str,
        guid: Uuid,
    ) -> Result<DatabaseManagerElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .repository
            .get_entity(guid)
            .await?
            .filter(|e| is_type_of(&e.type_name, type_names::DATABASE_MANAGER))
            .ok_or_else(|| OmagError::not_found("database_manager_guid", guid))?;
        Ok(to_element(&entity))
    }

    /// Check that `guid` names a registered software server capability whose qualified
    /// name is `name`.
    pub async fn validate_external_source(
        &self,
        guid: Uuid,
        name: &str,
    ) -> Result<ExternalSource, OmagError> {
        let entity = self
            .repository
            .get_entity(guid)
            .await?
            .filter(|e| is_type_of(&e.type_name, type_names::SOFTWARE_SERVER_CAPABILITY))
            .ok_or_else(|| {
                OmagError::invalid_parameter(
                    "external_source_guid",
                    format!("{guid} is not a registered metadata source"),
                )
            })?;
        if entity.qualified_name() != Some(name) {
            return Err(OmagError::invalid_parameter(
                "external_source_name",
                format!("'{name}' does not match the metadata source registered as {guid}"),
            ));
        }
        Ok(ExternalSource {
            guid,
            name: name.to_string(),
        })
    }

    /// Resolve the optional external source carried on a request. Both the guid and
    /// the name must be supplied together.
    pub async fn resolve_external_source(
        &self,
        guid: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<ExternalSource>, OmagError> {
        let guid = guid.filter(|g| !g.trim().is_empty());
        let name = name.filter(|n| !n.trim().is_empty());
        match (guid, name) {
            (None, None) => Ok(None),
            (Some(guid), Some(name)) => {
                let guid = validate_guid(guid, "external_source_guid")?;
                self.validate_external_source(guid, name).await.map(Some)
            }
            (Some(_), None) => Err(OmagError::invalid_parameter(
                "external_source_name",
                "an external source name is required with its guid",
            )),
            (None, Some(_)) => Err(OmagError::invalid_parameter(
                "external_source_guid",
                "an external source guid is required with its name",
            )),
        }
    }
}
