use async_trait::async_trait;
use chrono::{DateTime, Utc};
use omag_core::OmagError;
use omag_core::instances::{
    Classification, EntityDetail, ExternalSource, InstanceProperties, NewEntity, NewRelationship,
    Relationship,
};
use omag_core::repository::{EntityQuery, MetadataCollection};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const ENTITY_COLUMNS: &str = "guid, type_name, version, created_by, create_time, updated_by, \
     update_time, external_source, anchor_guid, properties, classifications";

const RELATIONSHIP_COLUMNS: &str = "guid, type_name, version, end1_guid, end2_guid, created_by, \
     create_time, updated_by, update_time, external_source, properties";

fn db_error(e: sqlx::Error) -> OmagError {
    OmagError::DatabaseError(e.to_string())
}

/// The metadata collection of one server, stored in PostgreSQL.
#[derive(Clone)]
pub struct PgMetadataCollection {
    pool: PgPool,
    collection_id: Uuid,
}

impl PgMetadataCollection {
    pub fn new(pool: PgPool, collection_id: Uuid) -> Self {
        Self {
            pool,
            collection_id,
        }
    }

    pub fn collection_id(&self) -> Uuid {
        self.collection_id
    }

    async fn entity_exists(&self, guid: Uuid) -> Result<bool, OmagError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM omrs_entities WHERE guid = $1 AND collection_id = $2)",
        )
        .bind(guid)
        .bind(self.collection_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.0)
    }
}

#[async_trait]
impl MetadataCollection for PgMetadataCollection {
    async fn add_entity(
        &self,
        user_id: &str,
        entity: NewEntity,
    ) -> Result<EntityDetail, OmagError> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            r#"
            INSERT INTO omrs_entities
                (guid, collection_id, type_name, created_by, external_source, anchor_guid,
                 properties, classifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ENTITY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(self.collection_id)
        .bind(&entity.type_name)
        .bind(user_id)
        .bind(entity.external_source.map(Json))
        .bind(entity.anchor_guid)
        .bind(Json(entity.properties))
        .bind(Json(entity.classifications))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_entity(&self, guid: Uuid) -> Result<Option<EntityDetail>, OmagError> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM omrs_entities WHERE guid = $1 AND collection_id = $2"
        ))
        .bind(guid)
        .bind(self.collection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn update_entity(
        &self,
        user_id: &str,
        entity: &EntityDetail,
    ) -> Result<EntityDetail, OmagError> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            r#"
            UPDATE omrs_entities
            SET properties = $1,
                classifications = $2,
                version = version + 1,
                updated_by = $3,
                update_time = NOW()
            WHERE guid = $4 AND collection_id = $5 AND version = $6
            RETURNING {ENTITY_COLUMNS}
            "#
        ))
        .bind(Json(&entity.properties))
        .bind(Json(&entity.classifications))
        .bind(user_id)
        .bind(entity.guid)
        .bind(self.collection_id)
        .bind(entity.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(row.into()),
            None if self.entity_exists(entity.guid).await? => Err(OmagError::PropertyServer(
                format!("Entity {} was updated concurrently", entity.guid),
            )),
            None => Err(OmagError::not_found("guid", entity.guid)),
        }
    }

    async fn delete_entity(&self, guid: Uuid) -> Result<(), OmagError> {
        // Relationships go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM omrs_entities WHERE guid = $1 AND collection_id = $2")
            .bind(guid)
            .bind(self.collection_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(OmagError::not_found("guid", guid));
        }
        Ok(())
    }

    async fn find_entities(&self, query: &EntityQuery) -> Result<Vec<EntityDetail>, OmagError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {ENTITY_COLUMNS} FROM omrs_entities WHERE collection_id = "
        ));
        builder.push_bind(self.collection_id);
        if !query.type_names.is_empty() {
            builder
                .push(" AND type_name = ANY(")
                .push_bind(query.type_names.clone())
                .push(")");
        }
        if let Some((name, value)) = &query.property {
            builder
                .push(" AND properties -> ")
                .push_bind(name.clone())
                .push(" = ")
                .push_bind(Json(value.clone()));
        }
        if let Some(anchor) = query.anchor_guid {
            builder.push(" AND anchor_guid = ").push_bind(anchor);
        }
        if let Some(source) = query.external_source_guid {
            builder
                .push(" AND external_source ->> 'guid' = ")
                .push_bind(source.to_string());
        }
        builder.push(" ORDER BY seq");

        let rows = builder
            .build_query_as::<EntityRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_relationship(
        &self,
        user_id: &str,
        relationship: NewRelationship,
    ) -> Result<Relationship, OmagError> {
        for end in [relationship.end1_guid, relationship.end2_guid] {
            if !self.entity_exists(end).await? {
                return Err(OmagError::not_found("guid", end));
            }
        }

        let row = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            INSERT INTO omrs_relationships
                (guid, collection_id, type_name, end1_guid, end2_guid, created_by,
                 external_source, properties)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RELATIONSHIP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(self.collection_id)
        .bind(&relationship.type_name)
        .bind(relationship.end1_guid)
        .bind(relationship.end2_guid)
        .bind(user_id)
        .bind(relationship.external_source.map(Json))
        .bind(Json(relationship.properties))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get_relationship(&self, guid: Uuid) -> Result<Option<Relationship>, OmagError> {
        let row = sqlx::query_as::<_, RelationshipRow>(&format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM omrs_relationships \
             WHERE guid = $1 AND collection_id = $2"
        ))
        .bind(guid)
        .bind(self.collection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn update_relationship(
        &self,
        user_id: &str,
        relationship: &Relationship,
    ) -> Result<Relationship, OmagError> {
        let row = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            UPDATE omrs_relationships
            SET properties = $1,
                version = version + 1,
                updated_by = $2,
                update_time = NOW()
            WHERE guid = $3 AND collection_id = $4 AND version = $5
            RETURNING {RELATIONSHIP_COLUMNS}
            "#
        ))
        .bind(Json(&relationship.properties))
        .bind(user_id)
        .bind(relationship.guid)
        .bind(self.collection_id)
        .bind(relationship.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(row.into()),
            None => match self.get_relationship(relationship.guid).await? {
                Some(_) => Err(OmagError::PropertyServer(format!(
                    "Relationship {} was updated concurrently",
                    relationship.guid
                ))),
                None => Err(OmagError::not_found("relationship_guid", relationship.guid)),
            },
        }
    }

    async fn delete_relationship(&self, guid: Uuid) -> Result<(), OmagError> {
        let result =
            sqlx::query("DELETE FROM omrs_relationships WHERE guid = $1 AND collection_id = $2")
                .bind(guid)
                .bind(self.collection_id)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(OmagError::not_found("relationship_guid", guid));
        }
        Ok(())
    }

    async fn get_relationships(
        &self,
        entity_guid: Uuid,
        type_name: Option<&str>,
    ) -> Result<Vec<Relationship>, OmagError> {
        let rows = sqlx::query_as::<_, RelationshipRow>(&format!(
            r#"
            SELECT {RELATIONSHIP_COLUMNS}
            FROM omrs_relationships
            WHERE collection_id = $1
              AND (end1_guid = $2 OR end2_guid = $2)
              AND ($3::VARCHAR IS NULL OR type_name = $3)
            ORDER BY seq
            "#
        ))
        .bind(self.collection_id)
        .bind(entity_guid)
        .bind(type_name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> Result<(), OmagError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct EntityRow {
    guid: Uuid,
    type_name: String,
    version: i64,
    created_by: String,
    create_time: DateTime<Utc>,
    updated_by: Option<String>,
    update_time: Option<DateTime<Utc>>,
    external_source: Option<Json<ExternalSource>>,
    anchor_guid: Option<Uuid>,
    properties: Json<InstanceProperties>,
    classifications: Json<Vec<Classification>>,
}

impl From<EntityRow> for EntityDetail {
    fn from(row: EntityRow) -> Self {
        EntityDetail {
            guid: row.guid,
            type_name: row.type_name,
            version: row.version,
            created_by: row.created_by,
            create_time: row.create_time,
            updated_by: row.updated_by,
            update_time: row.update_time,
            external_source: row.external_source.map(|s| s.0),
            anchor_guid: row.anchor_guid,
            properties: row.properties.0,
            classifications: row.classifications.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RelationshipRow {
    guid: Uuid,
    type_name: String,
    version: i64,
    end1_guid: Uuid,
    end2_guid: Uuid,
    created_by: String,
    create_time: DateTime<Utc>,
    updated_by: Option<String>,
    update_time: Option<DateTime<Utc>>,
    external_source: Option<Json<ExternalSource>>,
    properties: Json<InstanceProperties>,
}

impl From<RelationshipRow> for Relationship {
    fn from(row: RelationshipRow) -> Self {
        Relationship {
            guid: row.guid,
            type_name: row.type_name,
            version: row.version,
            end1_guid: row.end1_guid,
            end2_guid: row.end2_guid,
            created_by: row.created_by,
            create_time: row.create_time,
            updated_by: row.updated_by,
            update_time: row.update_time,
            external_source: row.external_source.map(|s| s.0),
            properties: row.properties.0,
        }
    }
}
