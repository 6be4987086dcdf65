use uuid::Uuid;

use super::{DatabaseHandler, Paging};
use crate::converters::to_element;
use crate::elements::{DatabaseElement, DatabaseSchemaElement};
use crate::error::OmagError;
use crate::instances::{ExternalSource, type_names};
use crate::models::{DatabaseProperties, DatabaseSchemaProperties, TemplateProperties};
use crate::repository::EntityQuery;
use crate::validation::validate_user_id;

impl DatabaseHandler {
    // -----------------------------------------------------------------------
    // Databases
    // -----------------------------------------------------------------------

    pub async fn create_database(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        properties: &DatabaseProperties,
    ) -> Result<Uuid, OmagError> {
        let entity = self
            .create_element(user_id, source, properties, type_names::DATABASE, None)
            .await?;
        Ok(entity.guid)
    }

    pub async fn create_database_from_template(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        let entity = self
            .create_from_template::<DatabaseProperties>(
                user_id,
                source,
                template_guid,
                template,
                type_names::DATABASE,
                None,
            )
            .await?;
        Ok(entity.guid)
    }

    pub async fn update_database(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseProperties,
    ) -> Result<(), OmagError> {
        self.update_element(
            user_id,
            source,
            database_guid,
            "database_guid",
            type_names::DATABASE,
            is_merge_update,
            properties,
        )
        .await?;
        Ok(())
    }

    /// Move the database into the publish zones.
    pub async fn publish_database(
        &self,
        user_id: &str,
        database_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.set_asset_zones(
            user_id,
            database_guid,
            "database_guid",
            type_names::DATABASE,
            &self.zones.publish_zones,
        )
        .await
    }

    /// Return the database to the default zones.
    pub async fn withdraw_database(
        &self,
        user_id: &str,
        database_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.set_asset_zones(
            user_id,
            database_guid,
            "database_guid",
            type_names::DATABASE,
            &self.zones.default_zones,
        )
        .await
    }

    /// Remove the database and the tables, views and columns anchored to it.
    /// Its schemas are detached.
    pub async fn remove_database(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_guid: Uuid,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let database = self
            .load(database_guid, "database_guid", &[type_names::DATABASE])
            .await?;
        Self::check_owner(&database, "external_source_guid", source)?;
        self.remove_asset(&database).await
    }

    pub async fn find_databases(
        &self,
        user_id: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        let found = self
            .find_elements(user_id, search_string, &[type_names::DATABASE], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_databases_by_name(
        &self,
        user_id: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        let found = self
            .elements_by_name(user_id, name, &[type_names::DATABASE], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    /// Databases published by the given database manager.
    pub async fn get_databases_for_database_manager(
        &self,
        user_id: &str,
        database_manager_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        validate_user_id(user_id)?;
        let paging = self.check_paging(paging)?;
        self.load(
            database_manager_guid,
            "database_manager_guid",
            &[type_names::SOFTWARE_SERVER_CAPABILITY],
        )
        .await?;
        let query = EntityQuery::of_types(vec![type_names::DATABASE.to_string()])
            .with_external_source(database_manager_guid);
        let found = self.visible(self.repository.find_entities(&query).await?).await?;
        Ok(paging.apply(found).iter().map(to_element).collect())
    }

    pub async fn get_database_by_guid(
        &self,
        user_id: &str,
        database_guid: Uuid,
    ) -> Result<DatabaseElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .load(database_guid, "database_guid", &[type_names::DATABASE])
            .await?;
        Ok(to_element(&entity))
    }

    // -----------------------------------------------------------------------
    // Database schemas
    // -----------------------------------------------------------------------

    /// Create a schema, optionally attached to a database.
    pub async fn create_database_schema(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_guid: Option<Uuid>,
        properties: &DatabaseSchemaProperties,
    ) -> Result<Uuid, OmagError> {
        if let Some(guid) = database_guid {
            self.load(guid, "database_guid", &[type_names::DATABASE])
                .await?;
        }
        let entity = self
            .create_element(
                user_id,
                source,
                properties,
                type_names::DATABASE_SCHEMA,
                None,
            )
            .await?;
        if let Some(guid) = database_guid {
            self.link(
                user_id,
                source,
                type_names::DATA_CONTENT_FOR_DATA_SET,
                guid,
                entity.guid,
            )
            .await?;
        }
        Ok(entity.guid)
    }

    pub async fn create_database_schema_from_template(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_guid: Option<Uuid>,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        if let Some(guid) = database_guid {
            self.load(guid, "database_guid", &[type_names::DATABASE])
                .await?;
        }
        let entity = self
            .create_from_template::<DatabaseSchemaProperties>(
                user_id,
                source,
                template_guid,
                template,
                type_names::DATABASE_SCHEMA,
                None,
            )
            .await?;
        if let Some(guid) = database_guid {
            self.link(
                user_id,
                source,
                type_names::DATA_CONTENT_FOR_DATA_SET,
                guid,
                entity.guid,
            )
            .await?;
        }
        Ok(entity.guid)
    }

    pub async fn update_database_schema(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        schema_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseSchemaProperties,
    ) -> Result<(), OmagError> {
        self.update_element(
            user_id,
            source,
            schema_guid,
            "database_schema_guid",
            type_names::DATABASE_SCHEMA,
            is_merge_update,
            properties,
        )
        .await?;
        Ok(())
    }

    pub async fn publish_database_schema(
        &self,
        user_id: &str,
        schema_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.set_asset_zones(
            user_id,
            schema_guid,
            "database_schema_guid",
            type_names::DATABASE_SCHEMA,
            &self.zones.publish_zones,
        )
        .await
    }

    pub async fn withdraw_database_schema(
        &self,
        user_id: &str,
        schema_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.set_asset_zones(
            user_id,
            schema_guid,
            "database_schema_guid",
            type_names::DATABASE_SCHEMA,
            &self.zones.default_zones,
        )
        .await
    }

    pub async fn remove_database_schema(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        schema_guid: Uuid,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let schema = self
            .load(
                schema_guid,
                "database_schema_guid",
                &[type_names::DATABASE_SCHEMA],
            )
            .await?;
        Self::check_owner(&schema, "external_source_guid", source)?;
        self.remove_asset(&schema).await
    }

    pub async fn find_database_schemas(
        &self,
        user_id: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        let found = self
            .find_elements(
                user_id,
                search_string,
                &[type_names::DATABASE_SCHEMA],
                paging,
            )
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_database_schemas_by_name(
        &self,
        user_id: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        let found = self
            .elements_by_name(user_id, name, &[type_names::DATABASE_SCHEMA], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_schemas_for_database(
        &self,
        user_id: &str,
        database_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        validate_user_id(user_id)?;
        let paging = self.check_paging(paging)?;
        self.load(database_guid, "database_guid", &[type_names::DATABASE])
            .await?;
        let schemas = self
            .children(
                database_guid,
                type_names::DATA_CONTENT_FOR_DATA_SET,
                &[type_names::DATABASE_SCHEMA],
            )
            .await?;
        Ok(paging.apply(schemas).iter().map(to_element).collect())
    }

    pub async fn get_database_schema_by_guid(
        &self,
        user_id: &str,
        schema_guid: Uuid,
    ) -> Result<DatabaseSchemaElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .load(
                schema_guid,
                "database_schema_guid",
                &[type_names::DATABASE_SCHEMA],
            )
            .await?;
        Ok(to_element(&entity))
    }
}

#[cfg(test)]
mod tests {
    use super::super::ServiceZones;
    use super::super::tests::{database, handler, handler_with, source};
    use super::*;
    use crate::models::DatabaseTableProperties;

    fn schema(qualified_name: &str) -> DatabaseSchemaProperties {
        DatabaseSchemaProperties {
            qualified_name: qualified_name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_database() {
        let handler = handler();
        let daemon = source("postgres-monitor");
        let guid = handler
            .create_database("erinoverview", Some(&daemon), &database("hr"))
            .await
            .unwrap();

        let element = handler.get_database_by_guid("erinoverview", guid).await.unwrap();
        assert_eq!(element.header.guid, guid);
        assert_eq!(element.header.type_name, "Database");
        assert_eq!(element.header.created_by, "erinoverview");
        assert_eq!(element.header.external_source, Some(daemon));
        assert_eq!(element.properties.qualified_name, "hr");
    }

    #[tokio::test]
    async fn test_qualified_name_required_and_unique() {
        let handler = handler();
        let err = handler
            .create_database("u", None, &database(""))
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("qualified_name"));

        handler.create_database("u", None, &database("hr")).await.unwrap();
        let err = handler
            .create_database("u", None, &database("hr"))
            .await
            .unwrap_err();
        assert!(matches!(err, OmagError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_update_requires_owning_source() {
        let handler = handler();
        let owner = source("owner");
        let guid = handler
            .create_database("u", Some(&owner), &database("hr"))
            .await
            .unwrap();

        let err = handler
            .update_database("u", None, guid, true, &database("hr"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("owner"));

        let err = handler
            .remove_database("u", Some(&source("intruder")), guid)
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("external_source_guid"));

        handler
            .update_database("u", Some(&owner), guid, true, &database("hr"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_merge_and_replace_update() {
        let handler = handler();
        let guid = handler
            .create_database(
                "u",
                None,
                &DatabaseProperties {
                    qualified_name: "hr".into(),
                    description: Some("Human resources".into()),
                    database_type: Some("PostgreSQL".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let update = DatabaseProperties {
            qualified_name: "hr".into(),
            database_version: Some("16".into()),
            ..Default::default()
        };
        handler
            .update_database("u", None, guid, true, &update)
            .await
            .unwrap();
        let merged = handler.get_database_by_guid("u", guid).await.unwrap();
        assert_eq!(merged.properties.database_type.as_deref(), Some("PostgreSQL"));
        assert_eq!(merged.properties.database_version.as_deref(), Some("16"));
        assert_eq!(merged.header.version, 2);

        handler
            .update_database("u", None, guid, false, &update)
            .await
            .unwrap();
        let replaced = handler.get_database_by_guid("u", guid).await.unwrap();
        assert_eq!(replaced.properties.database_type, None);
        assert_eq!(replaced.properties.database_version.as_deref(), Some("16"));
    }

    #[tokio::test]
    async fn test_publish_and_withdraw_move_zones() {
        let zones = ServiceZones {
            default_zones: vec!["quarantine".into()],
            publish_zones: vec!["data-lake".into()],
            supported_zones: vec![],
        };
        let handler = handler_with(zones, 100);
        let guid = handler.create_database("u", None, &database("hr")).await.unwrap();

        let zones_of = |e: DatabaseElement| e.properties.zone_membership.unwrap_or_default();
        let created = handler.get_database_by_guid("u", guid).await.unwrap();
        assert_eq!(zones_of(created), vec!["quarantine"]);

        handler.publish_database("u", guid).await.unwrap();
        let published = handler.get_database_by_guid("u", guid).await.unwrap();
        assert_eq!(zones_of(published), vec!["data-lake"]);

        handler.withdraw_database("u", guid).await.unwrap();
        let withdrawn = handler.get_database_by_guid("u", guid).await.unwrap();
        assert_eq!(zones_of(withdrawn), vec!["quarantine"]);
    }

    #[tokio::test]
    async fn test_unsupported_zones_are_invisible() {
        let zones = ServiceZones {
            default_zones: vec!["quarantine".into()],
            publish_zones: vec!["data-lake".into()],
            supported_zones: vec!["data-lake".into()],
        };
        let handler = handler_with(zones, 100);
        let guid = handler.create_database("u", None, &database("hr")).await.unwrap();

        let err = handler.get_database_by_guid("u", guid).await.unwrap_err();
        assert!(matches!(err, OmagError::ElementNotFound { .. }));
        assert!(handler.find_databases("u", ".*", Paging::default()).await.unwrap().is_empty());

        handler.publish_database("u", guid).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_find_by_regex_with_paging() {
        let handler = handler();
        for name in ["hr", "hr-archive", "sales", "hr-test"] {
            handler.create_database("u", None, &database(name)).await.unwrap();
        }

        let found = handler.find_databases("u", "^hr", Paging::default()).await.unwrap();
        assert_eq!(found.len(), 3);

        let page = handler.find_databases("u", "^hr", Paging::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].properties.qualified_name, "hr-archive");

        let by_name = handler
            .get_databases_by_name("u", "sales", Paging::default())
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
    }

    #[tokio::test]
    async fn test_schemas_for_database() {
        let handler = handler();
        let db = handler.create_database("u", None, &database("hr")).await.unwrap();
        let public = handler
            .create_database_schema("u", None, Some(db), &schema("hr.public"))
            .await
            .unwrap();
        handler
            .create_database_schema("u", None, None, &schema("standalone"))
            .await
            .unwrap();

        let schemas = handler
            .get_schemas_for_database("u", db, Paging::default())
            .await
            .unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].header.guid, public);

        let err = handler
            .create_database_schema("u", None, Some(Uuid::new_v4()), &schema("orphan"))
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("database_guid"));
    }

    #[tokio::test]
    async fn test_remove_database_detaches_schemas_and_deletes_tables() {
        let handler = handler();
        let db = handler.create_database("u", None, &database("hr")).await.unwrap();
        let schema_guid = handler
            .create_database_schema("u", None, Some(db), &schema("hr.public"))
            .await
            .unwrap();
        let table = handler
            .create_database_table(
                "u",
                None,
                db,
                &DatabaseTableProperties {
                    qualified_name: "hr.audit".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        handler.remove_database("u", None, db).await.unwrap();

        assert!(handler.get_database_by_guid("u", db).await.is_err());
        assert!(handler.get_database_table_by_guid("u", table).await.is_err());
        assert!(handler.get_database_schema_by_guid("u", schema_guid).await.is_ok());
    }

    #[tokio::test]
    async fn test_database_from_template() {
        let handler = handler();
        let template = handler
            .create_database(
                "u",
                None,
                &DatabaseProperties {
                    qualified_name: "template".into(),
                    database_type: Some("PostgreSQL".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let copy = handler
            .create_database_from_template(
                "u",
                None,
                template,
                &TemplateProperties {
                    qualified_name: "finance".into(),
                    display_name: Some("Finance".into()),
                    description: None,
                },
            )
            .await
            .unwrap();

        let element = handler.get_database_by_guid("u", copy).await.unwrap();
        assert_eq!(element.properties.qualified_name, "finance");
        assert_eq!(element.properties.display_name.as_deref(), Some("Finance"));
        assert_eq!(element.properties.database_type.as_deref(), Some("PostgreSQL"));
    }
}
