use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::instances::{EntityDetail, ExternalSource};
use crate::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, DatabaseViewProperties,
};

/// Identity and audit information common to every returned element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementHeader {
    pub guid: Uuid,
    pub type_name: String,
    pub version: i64,
    pub created_by: String,
    pub create_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_source: Option<ExternalSource>,
}

impl From<&EntityDetail> for ElementHeader {
    fn from(entity: &EntityDetail) -> Self {
        Self {
            guid: entity.guid,
            type_name: entity.type_name.clone(),
            version: entity.version,
            created_by: entity.created_by.clone(),
            create_time: entity.create_time,
            updated_by: entity.updated_by.clone(),
            update_time: entity.update_time,
            external_source: entity.external_source.clone(),
        }
    }
}

/// A stored element: header plus its property bean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataElement<P> {
    pub header: ElementHeader,
    pub properties: P,
}

pub type DatabaseManagerElement = MetadataElement<DatabaseManagerProperties>;
pub type DatabaseElement = MetadataElement<DatabaseProperties>;
pub type DatabaseSchemaElement = MetadataElement<DatabaseSchemaProperties>;
pub type DatabaseTableElement = MetadataElement<DatabaseTableProperties>;
pub type DatabaseViewElement = MetadataElement<DatabaseViewProperties>;

/// A foreign key pointing at the column that holds the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyElement {
    pub relationship_guid: Uuid,
    pub primary_key_column_guid: Uuid,
    pub properties: DatabaseForeignKeyProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseColumnElement {
    pub header: ElementHeader,
    pub properties: DatabaseColumnProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<DatabasePrimaryKeyProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyElement>,
}
