//! Import of a database description through the Data Manager access service.
//!
//! The description is a JSON document naming the database manager that owns the
//! catalogue entries and the databases it hosts:
//!
//! ```json
//! {
//!   "database_manager": { "qualified_name": "coco.hr.postgres" },
//!   "databases": [{
//!     "properties": { "qualified_name": "coco.hr" },
//!     "schemas": [{
//!       "properties": { "qualified_name": "coco.hr.public" },
//!       "tables": [{
//!         "properties": { "qualified_name": "coco.hr.public.department" },
//!         "columns": [{
//!           "properties": { "qualified_name": "coco.hr.public.department.id" },
//!           "primary_key": { "name": "department_pk" }
//!         }]
//!       }]
//!     }]
//!   }],
//!   "foreign_keys": [{
//!     "primary_key_column": "coco.hr.public.department.id",
//!     "foreign_key_column": "coco.hr.public.employee.dept_id"
//!   }]
//! }
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use omag_client::DatabaseManagerClient;
use omag_core::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, DatabaseViewProperties,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDescription {
    pub database_manager: DatabaseManagerProperties,
    #[serde(default)]
    pub databases: Vec<DatabaseDescription>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseDescription {
    pub properties: DatabaseProperties,
    #[serde(default)]
    pub schemas: Vec<SchemaDescription>,
    /// Tables held directly by the database rather than in a schema.
    #[serde(default)]
    pub tables: Vec<TableDescription>,
    #[serde(default)]
    pub views: Vec<TableDescription>,
    /// Publish the database once all of its contents are catalogued.
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDescription {
    pub properties: DatabaseSchemaProperties,
    #[serde(default)]
    pub tables: Vec<TableDescription>,
    #[serde(default)]
    pub views: Vec<TableDescription>,
}

/// A table or a view; views carry an optional defining expression.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDescription {
    pub properties: DatabaseTableProperties,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDescription {
    pub properties: DatabaseColumnProperties,
    #[serde(default)]
    pub primary_key: Option<DatabasePrimaryKeyProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyDescription {
    pub primary_key_column: String,
    pub foreign_key_column: String,
    #[serde(default)]
    pub properties: DatabaseForeignKeyProperties,
}

/// Counts of the elements created by an import.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub database_manager_guid: Option<Uuid>,
    pub databases: usize,
    pub schemas: usize,
    pub tables: usize,
    pub views: usize,
    pub columns: usize,
    pub primary_keys: usize,
    pub foreign_keys: usize,
}

impl CatalogDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        let description: Self =
            serde_json::from_str(json).context("Invalid catalog description")?;
        description.check_foreign_keys()?;
        Ok(description)
    }

    fn column_names(&self) -> impl Iterator<Item = &str> {
        self.databases
            .iter()
            .flat_map(|db| {
                db.schemas
                    .iter()
                    .flat_map(|s| s.tables.iter().chain(s.views.iter()))
                    .chain(db.tables.iter().chain(db.views.iter()))
            })
            .flat_map(|t| t.columns.iter())
            .map(|c| c.properties.qualified_name.as_str())
    }

    /// Every foreign key must name two columns described in the same document.
    fn check_foreign_keys(&self) -> Result<()> {
        let known: Vec<&str> = self.column_names().collect();
        for fk in &self.foreign_keys {
            for column in [&fk.primary_key_column, &fk.foreign_key_column] {
                if !known.contains(&column.as_str()) {
                    bail!("Foreign key refers to unknown column '{column}'");
                }
            }
        }
        Ok(())
    }
}

/// Catalogue everything in `description`, registering the database manager first
/// so that every element is owned by it.
pub async fn import(
    client: &mut DatabaseManagerClient,
    description: &CatalogDescription,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let manager_guid = client
        .create_database_manager(&description.database_manager)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to register database manager")?;
    summary.database_manager_guid = Some(manager_guid);
    tracing::info!(
        "Registered database manager {} as {}",
        description.database_manager.qualified_name,
        manager_guid
    );

    let mut columns = HashMap::new();
    for database in &description.databases {
        let database_guid = client
            .create_database(&database.properties)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| {
                format!("Failed to create database {}", database.properties.qualified_name)
            })?;
        summary.databases += 1;

        for schema in &database.schemas {
            let schema_guid = client
                .create_database_schema(Some(database_guid), &schema.properties)
                .await
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| {
                    format!("Failed to create schema {}", schema.properties.qualified_name)
                })?;
            summary.schemas += 1;
            import_tables(
                client,
                schema_guid,
                &schema.tables,
                &schema.views,
                &mut columns,
                &mut summary,
            )
            .await?;
        }
        import_tables(
            client,
            database_guid,
            &database.tables,
            &database.views,
            &mut columns,
            &mut summary,
        )
        .await?;

        if database.publish {
            client
                .publish_database(database_guid)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }

    for fk in &description.foreign_keys {
        let (Some(primary), Some(foreign)) = (
            columns.get(fk.primary_key_column.as_str()),
            columns.get(fk.foreign_key_column.as_str()),
        ) else {
            bail!(
                "Foreign key {} -> {} names an uncatalogued column",
                fk.foreign_key_column,
                fk.primary_key_column
            );
        };
        client
            .add_foreign_key(*primary, *foreign, &fk.properties)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        summary.foreign_keys += 1;
    }

    Ok(summary)
}

async fn import_tables<'a>(
    client: &DatabaseManagerClient,
    asset_guid: Uuid,
    tables: &'a [TableDescription],
    views: &'a [TableDescription],
    columns: &mut HashMap<&'a str, Uuid>,
    summary: &mut ImportSummary,
) -> Result<()> {
    for table in tables {
        let guid = client
            .create_database_table(asset_guid, &table.properties)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| {
                format!("Failed to create table {}", table.properties.qualified_name)
            })?;
        summary.tables += 1;
        import_columns(client, guid, &table.columns, columns, summary).await?;
    }
    for view in views {
        let properties = DatabaseViewProperties {
            qualified_name: view.properties.qualified_name.clone(),
            display_name: view.properties.display_name.clone(),
            description: view.properties.description.clone(),
            aliases: view.properties.aliases.clone(),
            is_deprecated: view.properties.is_deprecated,
            expression: view.expression.clone(),
            additional_properties: view.properties.additional_properties.clone(),
            vendor_properties: view.properties.vendor_properties.clone(),
        };
        let guid = client
            .create_database_view(asset_guid, &properties)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Failed to create view {}", properties.qualified_name))?;
        summary.views += 1;
        import_columns(client, guid, &view.columns, columns, summary).await?;
    }
    Ok(())
}

async fn import_columns<'a>(
    client: &DatabaseManagerClient,
    table_guid: Uuid,
    descriptions: &'a [ColumnDescription],
    columns: &mut HashMap<&'a str, Uuid>,
    summary: &mut ImportSummary,
) -> Result<()> {
    for column in descriptions {
        let guid = client
            .create_database_column(table_guid, &column.properties)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| {
                format!("Failed to create column {}", column.properties.qualified_name)
            })?;
        summary.columns += 1;
        if let Some(key) = &column.primary_key {
            client
                .set_primary_key(guid, key)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            summary.primary_keys += 1;
        }
        columns.insert(column.properties.qualified_name.as_str(), guid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HR: &str = r#"{
        "database_manager": { "qualified_name": "coco.hr.postgres" },
        "databases": [{
            "properties": { "qualified_name": "coco.hr", "database_type": "PostgreSQL" },
            "schemas": [{
                "properties": { "qualified_name": "coco.hr.public" },
                "tables": [
                    { "properties": { "qualified_name": "coco.hr.public.department" },
                      "columns": [{ "properties": { "qualified_name": "coco.hr.public.department.id" },
                                    "primary_key": { "name": "department_pk" } }] },
                    { "properties": { "qualified_name": "coco.hr.public.employee" },
                      "columns": [{ "properties": { "qualified_name": "coco.hr.public.employee.dept_id" } }] }
                ],
                "views": [
                    { "properties": { "qualified_name": "coco.hr.public.headcount" },
                      "expression": "select count(*) from employee" }
                ]
            }],
            "publish": true
        }],
        "foreign_keys": [{
            "primary_key_column": "coco.hr.public.department.id",
            "foreign_key_column": "coco.hr.public.employee.dept_id",
            "properties": { "confidence": 100 }
        }]
    }"#;

    #[test]
    fn test_parse_description() {
        let description = CatalogDescription::from_json(HR).unwrap();
        assert_eq!(description.database_manager.qualified_name, "coco.hr.postgres");
        let database = &description.databases[0];
        assert!(database.publish);
        assert_eq!(database.schemas[0].tables.len(), 2);
        assert_eq!(
            database.schemas[0].views[0].expression.as_deref(),
            Some("select count(*) from employee")
        );
        assert_eq!(
            database.schemas[0].tables[0].columns[0]
                .primary_key
                .as_ref()
                .and_then(|k| k.name.as_deref()),
            Some("department_pk")
        );
        assert_eq!(description.foreign_keys[0].properties.confidence, Some(100));
        assert_eq!(description.column_names().count(), 2);
    }

    #[test]
    fn test_foreign_key_to_unknown_column_rejected() {
        let json = r#"{
            "database_manager": { "qualified_name": "m" },
            "databases": [],
            "foreign_keys": [{ "primary_key_column": "a", "foreign_key_column": "b" }]
        }"#;
        let err = CatalogDescription::from_json(json).unwrap_err();
        assert!(err.to_string().contains("unknown column 'a'"));
    }

    async fn start_platform() -> String {
        use std::sync::Arc;

        use omag_core::PlatformSecurity;
        use omag_core::admin::InMemoryConfigStore;
        use omag_core::operations::InMemoryConnectorFactory;
        use omag_server::state::AppState;

        let state = Arc::new(AppState::new(
            Arc::new(InMemoryConfigStore::new()),
            PlatformSecurity::new(vec!["garygeeke".to_string()]),
            Arc::new(InMemoryConnectorFactory),
            None,
        ));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, omag_server::routes::router(state))
                .await
                .unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_import_against_platform() {
        use omag_client::{RestClient, ServerConfigurationClient, ServerOperationsClient};
        use omag_core::Paging;
        use omag_core::admin::ServiceOptions;

        let url = start_platform().await;
        let rest = RestClient::new(&url).unwrap();
        let config = ServerConfigurationClient::new(rest.clone(), "garygeeke");
        config.set_in_memory_local_repository("cocoMDS1").await.unwrap();
        config
            .enable_access_service("cocoMDS1", "data-manager", &ServiceOptions::new())
            .await
            .unwrap();
        ServerOperationsClient::new(rest.clone(), "garygeeke")
            .activate_with_stored_config("cocoMDS1")
            .await
            .unwrap();

        let description = CatalogDescription::from_json(HR).unwrap();
        let mut client = DatabaseManagerClient::new(rest, "cocoMDS1", "erinoverview");
        let summary = import(&mut client, &description).await.unwrap();
        assert_eq!(summary.databases, 1);
        assert_eq!(summary.schemas, 1);
        assert_eq!(summary.tables, 2);
        assert_eq!(summary.views, 1);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.primary_keys, 1);
        assert_eq!(summary.foreign_keys, 1);

        let columns = client
            .find_database_columns("coco\\.hr\\.public\\.employee\\..*", Paging::default())
            .await
            .unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].foreign_keys.len(), 1);
        let views = client
            .get_database_views_by_name("coco.hr.public.headcount", Paging::default())
            .await
            .unwrap();
        assert_eq!(
            views[0].properties.expression.as_deref(),
            Some("select count(*) from employee")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{ "database_manager": { "qualified_name": "m" }, "tables": [] }"#;
        assert!(CatalogDescription::from_json(json).is_err());
    }
}
