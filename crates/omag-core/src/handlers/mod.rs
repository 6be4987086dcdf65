//! Lifecycle handlers for the elements published through the data-manager service.

mod column;
mod database;
mod metadata_source;
mod table;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::converters::{
    DISPLAY_NAME, ElementProperties, NAME, QUALIFIED_NAME, ZONE_MEMBERSHIP, apply_template,
    merge_properties, searchable_values,
};
use crate::error::OmagError;
use crate::instances::{
    EntityDetail, ExternalSource, InstanceProperties, NewEntity, NewRelationship, is_type_of,
    type_family,
};
use crate::models::TemplateProperties;
use crate::repository::{EntityQuery, MetadataCollection};
use crate::validation::{validate_name, validate_paging, validate_search_string, validate_user_id};

pub use metadata_source::MetadataSourceHandler;

/// Offset and size of one page of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub start_from: usize,
    /// 0 returns as many results as the server allows.
    pub page_size: usize,
}

impl Paging {
    pub fn new(start_from: usize, page_size: usize) -> Self {
        Self {
            start_from,
            page_size,
        }
    }

    fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start_from)
            .take(self.page_size)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Governance zones
// ---------------------------------------------------------------------------

/// Zone settings of the data-manager service, read from its service options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceZones {
    /// Zones given to new assets that do not name their own.
    pub default_zones: Vec<String>,
    /// Zones set when an asset is published.
    pub publish_zones: Vec<String>,
    /// When non-empty, only assets in one of these zones are visible.
    pub supported_zones: Vec<String>,
}

impl ServiceZones {
    pub const DEFAULT_ZONES_OPTION: &'static str = "DefaultZones";
    pub const PUBLISH_ZONES_OPTION: &'static str = "PublishZones";
    pub const SUPPORTED_ZONES_OPTION: &'static str = "SupportedZones";

    /// Options hold either a JSON list or a comma-separated string.
    pub fn from_options(options: &serde_json::Map<String, Value>) -> Self {
        let zones = |key: &str| -> Vec<String> {
            match options.get(key) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(list)) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|z| !z.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            }
        };
        Self {
            default_zones: zones(Self::DEFAULT_ZONES_OPTION),
            publish_zones: zones(Self::PUBLISH_ZONES_OPTION),
            supported_zones: zones(Self::SUPPORTED_ZONES_OPTION),
        }
    }

    fn apply_default(&self, properties: &mut InstanceProperties) {
        if !properties.contains_key(ZONE_MEMBERSHIP) {
            set_zones(properties, &self.default_zones);
        }
    }

    /// Elements without zones are visible everywhere.
    pub fn is_visible(&self, properties: &InstanceProperties) -> bool {
        if self.supported_zones.is_empty() {
            return true;
        }
        let zones: Vec<&str> = properties
            .get(ZONE_MEMBERSHIP)
            .and_then(Value::as_array)
            .map(|z| z.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        zones.is_empty()
            || zones
                .iter()
                .any(|z| self.supported_zones.iter().any(|s| s == z))
    }
}

fn set_zones(properties: &mut InstanceProperties, zones: &[String]) {
    if zones.is_empty() {
        properties.remove(ZONE_MEMBERSHIP);
    } else {
        properties.insert(ZONE_MEMBERSHIP.into(), Value::from(zones.to_vec()));
    }
}

// ---------------------------------------------------------------------------
// DatabaseHandler
// ---------------------------------------------------------------------------

/// Creates, maintains and retrieves databases and their contents.
///
/// Databases and schemas are assets: they carry governance zones and anchor the tables,
/// views and columns created beneath them.
#[derive(Clone)]
pub struct DatabaseHandler {
    repository: Arc<dyn MetadataCollection>,
    zones: ServiceZones,
    max_page_size: usize,
}

impl DatabaseHandler {
    pub fn new(
        repository: Arc<dyn MetadataCollection>,
        zones: ServiceZones,
        max_page_size: usize,
    ) -> Self {
        Self {
            repository,
            zones,
            max_page_size,
        }
    }

    pub fn zones(&self) -> &ServiceZones {
        &self.zones
    }

    fn check_paging(&self, paging: Paging) -> Result<Paging, OmagError> {
        let page_size = validate_paging(paging.page_size, self.max_page_size)?;
        Ok(Paging::new(paging.start_from, page_size))
    }

    /// Fetch a visible entity of one of `types` (subtypes included).
    async fn load(
        &self,
        guid: Uuid,
        parameter: &str,
        types: &[&str],
    ) -> Result<EntityDetail, OmagError> {
        let entity = self
            .repository
            .get_entity(guid)
            .await?
            .filter(|e| types.iter().any(|t| is_type_of(&e.type_name, t)))
            .ok_or_else(|| OmagError::not_found(parameter, guid))?;
        if !self.is_visible(&entity).await? {
            return Err(OmagError::not_found(parameter, guid));
        }
        Ok(entity)
    }

    async fn is_visible(&self, entity: &EntityDetail) -> Result<bool, OmagError> {
        if !self.zones.is_visible(&entity.properties) {
            return Ok(false);
        }
        match entity.anchor_guid {
            Some(anchor) => Ok(self
                .repository
                .get_entity(anchor)
                .await?
                .is_none_or(|a| self.zones.is_visible(&a.properties))),
            None => Ok(true),
        }
    }

    async fn visible(&self, entities: Vec<EntityDetail>) -> Result<Vec<EntityDetail>, OmagError> {
        let mut visible = Vec::with_capacity(entities.len());
        for entity in entities {
            if self.is_visible(&entity).await? {
                visible.push(entity);
            }
        }
        Ok(visible)
    }

    async fn check_unique(
        &self,
        family: &str,
        qualified_name: &str,
        except: Option<Uuid>,
    ) -> Result<(), OmagError> {
        let query = EntityQuery::of_types(type_family(family))
            .with_property(QUALIFIED_NAME, Value::from(qualified_name));
        let clash = self
            .repository
            .find_entities(&query)
            .await?
            .into_iter()
            .any(|e| Some(e.guid) != except);
        if clash {
            return Err(OmagError::invalid_parameter(
                "qualified_name",
                format!("an element with qualified name '{qualified_name}' already exists"),
            ));
        }
        Ok(())
    }

    /// Only the external source that created an element may change it.
    fn check_owner(
        entity: &EntityDetail,
        parameter: &str,
        source: Option<&ExternalSource>,
    ) -> Result<(), OmagError> {
        let Some(owner) = &entity.external_source else {
            return Ok(());
        };
        if source.map(|s| s.guid) == Some(owner.guid) {
            return Ok(());
        }
        Err(OmagError::invalid_parameter(
            parameter,
            format!(
                "element {} is owned by external source '{}' ({})",
                entity.guid, owner.name, owner.guid
            ),
        ))
    }

    async fn create_element<P: ElementProperties>(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        properties: &P,
        family: &str,
        anchor_guid: Option<Uuid>,
    ) -> Result<EntityDetail, OmagError> {
        validate_user_id(user_id)?;
        validate_name(properties.qualified_name(), "qualified_name")?;
        self.check_unique(family, properties.qualified_name(), None)
            .await?;

        let mut instance = properties.to_instance_properties();
        if anchor_guid.is_none() {
            self.zones.apply_default(&mut instance);
        }
        let entity = self
            .repository
            .add_entity(
                user_id,
                NewEntity {
                    type_name: P::TYPE_NAME.to_string(),
                    external_source: source.cloned(),
                    anchor_guid,
                    properties: instance,
                    classifications: Vec::new(),
                },
            )
            .await?;
        tracing::debug!(guid = %entity.guid, type_name = %entity.type_name, "Element created");
        Ok(entity)
    }

    /// Shallow copy of `template_guid` with the template's identity overrides.
    async fn create_from_template<P: ElementProperties>(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        template_guid: Uuid,
        template: &TemplateProperties,
        family: &str,
        anchor_guid: Option<Uuid>,
    ) -> Result<EntityDetail, OmagError> {
        validate_user_id(user_id)?;
        validate_name(&template.qualified_name, "qualified_name")?;
        let original = self
            .load(template_guid, "template_guid", &[P::TYPE_NAME])
            .await?;
        self.check_unique(family, &template.qualified_name, None)
            .await?;

        let mut instance = apply_template::<P>(&original.properties, template);
        if anchor_guid.is_none() {
            instance.remove(ZONE_MEMBERSHIP);
            self.zones.apply_default(&mut instance);
        }
        let entity = self
            .repository
            .add_entity(
                user_id,
                NewEntity {
                    type_name: original.type_name.clone(),
                    external_source: source.cloned(),
                    anchor_guid,
                    properties: instance,
                    classifications: original.classifications.clone(),
                },
            )
            .await?;
        tracing::debug!(guid = %entity.guid, %template_guid, "Element created from template");
        Ok(entity)
    }

    #[allow(clippy::too_many_arguments)]
    async fn update_element<P: ElementProperties>(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        guid: Uuid,
        parameter: &str,
        family: &str,
        is_merge_update: bool,
        properties: &P,
    ) -> Result<EntityDetail, OmagError> {
        validate_user_id(user_id)?;
        validate_name(properties.qualified_name(), "qualified_name")?;
        let mut entity = self.load(guid, parameter, &[P::TYPE_NAME]).await?;
        Self::check_owner(&entity, "external_source_guid", source)?;
        self.check_unique(family, properties.qualified_name(), Some(guid))
            .await?;

        let mut updated = merge_properties(
            &entity.properties,
            properties.to_instance_properties(),
            is_merge_update,
        );
        if !updated.contains_key(ZONE_MEMBERSHIP) {
            if let Some(zones) = entity.properties.get(ZONE_MEMBERSHIP) {
                updated.insert(ZONE_MEMBERSHIP.into(), zones.clone());
            }
        }
        entity.properties = updated;
        self.repository.update_entity(user_id, &entity).await
    }

    async fn set_asset_zones(
        &self,
        user_id: &str,
        guid: Uuid,
        parameter: &str,
        type_name: &str,
        zones: &[String],
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let mut entity = self.load(guid, parameter, &[type_name]).await?;
        set_zones(&mut entity.properties, zones);
        self.repository.update_entity(user_id, &entity).await?;
        tracing::info!(%guid, ?zones, "Asset zones changed");
        Ok(())
    }

    /// Delete an asset together with everything anchored to it.
    async fn remove_asset(&self, asset: &EntityDetail) -> Result<(), OmagError> {
        let anchored = self
            .repository
            .find_entities(&EntityQuery::default().with_anchor(asset.guid))
            .await?;
        for entity in &anchored {
            self.repository.delete_entity(entity.guid).await?;
        }
        self.repository.delete_entity(asset.guid).await?;
        tracing::info!(
            guid = %asset.guid,
            anchored = anchored.len(),
            "Asset removed"
        );
        Ok(())
    }

    async fn find_elements(
        &self,
        user_id: &str,
        search_string: &str,
        types: &[&str],
        paging: Paging,
    ) -> Result<Vec<EntityDetail>, OmagError> {
        validate_user_id(user_id)?;
        let pattern = validate_search_string(search_string, "search_string")?;
        let paging = self.check_paging(paging)?;
        let query = EntityQuery::of_types(types.iter().map(|t| t.to_string()).collect());
        let matched = self
            .repository
            .find_entities(&query)
            .await?
            .into_iter()
            .filter(|e| {
                searchable_values(&e.properties)
                    .iter()
                    .any(|v| pattern.is_match(v))
            })
            .collect();
        Ok(paging.apply(self.visible(matched).await?))
    }

    async fn elements_by_name(
        &self,
        user_id: &str,
        name: &str,
        types: &[&str],
        paging: Paging,
    ) -> Result<Vec<EntityDetail>, OmagError> {
        validate_user_id(user_id)?;
        validate_name(name, "name")?;
        let paging = self.check_paging(paging)?;
        let query = EntityQuery::of_types(types.iter().map(|t| t.to_string()).collect());
        let matched = self
            .repository
            .find_entities(&query)
            .await?
            .into_iter()
            .filter(|e| {
                [QUALIFIED_NAME, NAME, DISPLAY_NAME]
                    .iter()
                    .any(|p| e.string_property(p) == Some(name))
            })
            .collect();
        Ok(paging.apply(self.visible(matched).await?))
    }

    /// Entities at end 2 of `relationship_type` relationships from `parent_guid`.
    async fn children(
        &self,
        parent_guid: Uuid,
        relationship_type: &str,
        types: &[&str],
    ) -> Result<Vec<EntityDetail>, OmagError> {
        let relationships = self
            .repository
            .get_relationships(parent_guid, Some(relationship_type))
            .await?;
        let mut children = Vec::new();
        for relationship in relationships
            .into_iter()
            .filter(|r| r.end1_guid == parent_guid)
        {
            if let Some(child) = self.repository.get_entity(relationship.end2_guid).await? {
                if types.iter().any(|t| child.type_name == *t) {
                    children.push(child);
                }
            }
        }
        self.visible(children).await
    }

    async fn link(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        relationship_type: &str,
        end1_guid: Uuid,
        end2_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.repository
            .add_relationship(
                user_id,
                NewRelationship {
                    type_name: relationship_type.to_string(),
                    end1_guid,
                    end2_guid,
                    external_source: source.cloned(),
                    properties: InstanceProperties::new(),
                },
            )
            .await?;
        Ok(())
    }
}
