//! Client used by integration daemons to publish the contents of a database manager
//! through the Data Manager OMAS of a remote server.

use omag_core::OmagError;
use omag_core::Paging;
use omag_core::elements::{
    DatabaseColumnElement, DatabaseElement, DatabaseManagerElement, DatabaseSchemaElement,
    DatabaseTableElement, DatabaseViewElement,
};
use omag_core::instances::ExternalSource;
use omag_core::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, DatabaseViewProperties, TemplateProperties,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::rest::{ElementResponse, ElementsResponse, GuidResponse, RestClient, Void};

const DATA_MANAGER_BASE: &str =
    "/servers/{}/open-metadata/access-services/data-manager/users/{}";

/// Request body naming the external source and, for creates and updates, the element's
/// properties.
#[derive(Serialize)]
struct SourcedRequest<'a, P: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    external_source_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_source_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a P>,
}

#[derive(Serialize)]
struct SearchStringRequest<'a> {
    search_string: &'a str,
}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

fn paging_query(paging: Paging) -> Vec<(&'static str, String)> {
    vec![
        ("start_from", paging.start_from.to_string()),
        ("page_size", paging.page_size.to_string()),
    ]
}

/// Talks to the data-manager service of one server as one user.
///
/// After [`create_database_manager`](Self::create_database_manager) the client
/// remembers the registered database manager and sends it as the external source of
/// every later change, so the elements it creates belong to that manager.
#[derive(Clone)]
pub struct DatabaseManagerClient {
    rest: RestClient,
    server_name: String,
    user_id: String,
    external_source: Option<ExternalSource>,
}

impl DatabaseManagerClient {
    pub fn new(
        rest: RestClient,
        server_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            rest,
            server_name: server_name.into(),
            user_id: user_id.into(),
            external_source: None,
        }
    }

    /// Act for a database manager registered earlier.
    pub fn with_external_source(mut self, source: ExternalSource) -> Self {
        self.external_source = Some(source);
        self
    }

    pub fn external_source(&self) -> Option<&ExternalSource> {
        self.external_source.as_ref()
    }

    fn url(
        &self,
        suffix: &str,
        guids: &[Uuid],
        query: &[(&str, String)],
    ) -> Result<Url, OmagError> {
        let guids: Vec<String> = guids.iter().map(Uuid::to_string).collect();
        let mut params = vec![self.server_name.as_str(), self.user_id.as_str()];
        params.extend(guids.iter().map(String::as_str));
        self.rest
            .url(&format!("{DATA_MANAGER_BASE}{suffix}"), &params, query)
    }

    fn sourced<'a, P: Serialize>(&'a self, properties: Option<&'a P>) -> SourcedRequest<'a, P> {
        SourcedRequest {
            external_source_guid: self.external_source.as_ref().map(|s| s.guid.to_string()),
            external_source_name: self.external_source.as_ref().map(|s| s.name.as_str()),
            properties,
        }
    }

    async fn create<P: Serialize>(
        &self,
        suffix: &str,
        guids: &[Uuid],
        query: &[(&str, String)],
        properties: &P,
    ) -> Result<Uuid, OmagError> {
        let url = self.url(suffix, guids, query)?;
        let response: GuidResponse = self
            .rest
            .post(url, Some(&self.sourced(Some(properties))))
            .await?;
        Ok(response.guid)
    }

    async fn update<P: Serialize>(
        &self,
        suffix: &str,
        guids: &[Uuid],
        is_merge_update: bool,
        properties: &P,
    ) -> Result<(), OmagError> {
        let url = self.url(
            suffix,
            guids,
            &[("is_merge_update", is_merge_update.to_string())],
        )?;
        self.rest
            .post::<_, Void>(url, Some(&self.sourced(Some(properties))))
            .await?;
        Ok(())
    }

    /// POST carrying only the external source.
    async fn post_sourced(&self, suffix: &str, guids: &[Uuid]) -> Result<(), OmagError> {
        let url = self.url(suffix, guids, &[])?;
        self.rest
            .post::<_, Void>(url, Some(&self.sourced::<()>(None)))
            .await?;
        Ok(())
    }

    async fn post_empty(&self, suffix: &str, guids: &[Uuid]) -> Result<(), OmagError> {
        let url = self.url(suffix, guids, &[])?;
        self.rest.post::<(), Void>(url, None).await?;
        Ok(())
    }

    async fn element<T: DeserializeOwned>(
        &self,
        suffix: &str,
        guids: &[Uuid],
    ) -> Result<T, OmagError> {
        let response: ElementResponse<T> = self.rest.get(self.url(suffix, guids, &[])?).await?;
        Ok(response.element)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        suffix: &str,
        guids: &[Uuid],
        paging: Paging,
    ) -> Result<Vec<T>, OmagError> {
        let url = self.url(suffix, guids, &paging_query(paging))?;
        let response: ElementsResponse<T> = self.rest.get(url).await?;
        Ok(response.elements)
    }

    async fn find<T: DeserializeOwned>(
        &self,
        suffix: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<T>, OmagError> {
        let url = self.url(suffix, &[], &paging_query(paging))?;
        let response: ElementsResponse<T> = self
            .rest
            .post(url, Some(&SearchStringRequest { search_string }))
            .await?;
        Ok(response.elements)
    }

    async fn by_name<T: DeserializeOwned>(
        &self,
        suffix: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<T>, OmagError> {
        let url = self.url(suffix, &[], &paging_query(paging))?;
        let response: ElementsResponse<T> = self.rest.post(url, Some(&NameRequest { name })).await?;
        Ok(response.elements)
    }

    // -----------------------------------------------------------------------
    // Database managers
    // -----------------------------------------------------------------------

    /// Register the database manager and adopt it as this client's external source.
    pub async fn create_database_manager(
        &mut self,
        properties: &DatabaseManagerProperties,
    ) -> Result<Uuid, OmagError> {
        let url = self.url("/database-managers", &[], &[])?;
        let request = SourcedRequest {
            external_source_guid: None,
            external_source_name: None,
            properties: Some(properties),
        };
        let response: GuidResponse = self.rest.post(url, Some(&request)).await?;
        self.external_source = Some(ExternalSource {
            guid: response.guid,
            name: properties.qualified_name.clone(),
        });
        tracing::info!(
            guid = %response.guid,
            qualified_name = %properties.qualified_name,
            "Registered database manager"
        );
        Ok(response.guid)
    }

    pub async fn get_database_manager(
        &self,
        guid: Uuid,
    ) -> Result<DatabaseManagerElement, OmagError> {
        self.element("/database-managers/{}", &[guid]).await
    }

    /// GUID of the metadata source registered under `qualified_name`.
    pub async fn get_metadata_source_guid(&self, qualified_name: &str) -> Result<Uuid, OmagError> {
        let url = self.rest.url(
            &format!("{DATA_MANAGER_BASE}/metadata-sources/by-name/{{}}"),
            &[self.server_name.as_str(), self.user_id.as_str(), qualified_name],
            &[],
        )?;
        let response: GuidResponse = self.rest.get(url).await?;
        Ok(response.guid)
    }

    // -----------------------------------------------------------------------
    // Databases
    // -----------------------------------------------------------------------

    pub async fn create_database(
        &self,
        properties: &DatabaseProperties,
    ) -> Result<Uuid, OmagError> {
        self.create("/databases", &[], &[], properties).await
    }

    pub async fn create_database_from_template(
        &self,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        self.create("/databases/from-template/{}", &[template_guid], &[], template)
            .await
    }

    pub async fn update_database(
        &self,
        database_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseProperties,
    ) -> Result<(), OmagError> {
        self.update("/databases/{}", &[database_guid], is_merge_update, properties)
            .await
    }

    pub async fn publish_database(&self, database_guid: Uuid) -> Result<(), OmagError> {
        self.post_empty("/databases/{}/publish", &[database_guid]).await
    }

    pub async fn withdraw_database(&self, database_guid: Uuid) -> Result<(), OmagError> {
        self.post_empty("/databases/{}/withdraw", &[database_guid]).await
    }

    pub async fn remove_database(&self, database_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/databases/{}/delete", &[database_guid]).await
    }

    pub async fn find_databases(
        &self,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        self.find("/databases/by-search-string", search_string, paging)
            .await
    }

    pub async fn get_databases_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        self.by_name("/databases/by-name", name, paging).await
    }

    pub async fn get_databases_for_database_manager(
        &self,
        database_manager_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseElement>, OmagError> {
        self.list(
            "/databases/by-database-manager/{}",
            &[database_manager_guid],
            paging,
        )
        .await
    }

    pub async fn get_database_by_guid(
        &self,
        database_guid: Uuid,
    ) -> Result<DatabaseElement, OmagError> {
        self.element("/databases/{}", &[database_guid]).await
    }

    // -----------------------------------------------------------------------
    // Database schemas
    // -----------------------------------------------------------------------

    fn schema_query(database_guid: Option<Uuid>) -> Vec<(&'static str, String)> {
        database_guid
            .map(|g| vec![("database_guid", g.to_string())])
            .unwrap_or_default()
    }

    pub async fn create_database_schema(
        &self,
        database_guid: Option<Uuid>,
        properties: &DatabaseSchemaProperties,
    ) -> Result<Uuid, OmagError> {
        self.create("/schemas", &[], &Self::schema_query(database_guid), properties)
            .await
    }

    pub async fn create_database_schema_from_template(
        &self,
        database_guid: Option<Uuid>,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/schemas/from-template/{}",
            &[template_guid],
            &Self::schema_query(database_guid),
            template,
        )
        .await
    }

    pub async fn update_database_schema(
        &self,
        schema_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseSchemaProperties,
    ) -> Result<(), OmagError> {
        self.update("/schemas/{}", &[schema_guid], is_merge_update, properties)
            .await
    }

    pub async fn publish_database_schema(&self, schema_guid: Uuid) -> Result<(), OmagError> {
        self.post_empty("/schemas/{}/publish", &[schema_guid]).await
    }

    pub async fn withdraw_database_schema(&self, schema_guid: Uuid) -> Result<(), OmagError> {
        self.post_empty("/schemas/{}/withdraw", &[schema_guid]).await
    }

    pub async fn remove_database_schema(&self, schema_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/schemas/{}/delete", &[schema_guid]).await
    }

    pub async fn find_database_schemas(
        &self,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        self.find("/schemas/by-search-string", search_string, paging).await
    }

    pub async fn get_database_schemas_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        self.by_name("/schemas/by-name", name, paging).await
    }

    pub async fn get_schemas_for_database(
        &self,
        database_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseSchemaElement>, OmagError> {
        self.list("/databases/{}/schemas", &[database_guid], paging).await
    }

    pub async fn get_database_schema_by_guid(
        &self,
        schema_guid: Uuid,
    ) -> Result<DatabaseSchemaElement, OmagError> {
        self.element("/schemas/{}", &[schema_guid]).await
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    /// Create a table in a database or a database schema.
    pub async fn create_database_table(
        &self,
        database_asset_guid: Uuid,
        properties: &DatabaseTableProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/database-assets/{}/tables",
            &[database_asset_guid],
            &[],
            properties,
        )
        .await
    }

    pub async fn create_database_table_from_template(
        &self,
        database_asset_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/database-assets/{}/tables/from-template/{}",
            &[database_asset_guid, template_guid],
            &[],
            template,
        )
        .await
    }

    pub async fn update_database_table(
        &self,
        table_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseTableProperties,
    ) -> Result<(), OmagError> {
        self.update("/tables/{}", &[table_guid], is_merge_update, properties)
            .await
    }

    pub async fn remove_database_table(&self, table_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/tables/{}/delete", &[table_guid]).await
    }

    pub async fn find_database_tables(
        &self,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        self.find("/tables/by-search-string", search_string, paging).await
    }

    pub async fn get_database_tables_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        self.by_name("/tables/by-name", name, paging).await
    }

    pub async fn get_tables_for_database_asset(
        &self,
        database_asset_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        self.list("/database-assets/{}/tables", &[database_asset_guid], paging)
            .await
    }

    pub async fn get_database_table_by_guid(
        &self,
        table_guid: Uuid,
    ) -> Result<DatabaseTableElement, OmagError> {
        self.element("/tables/{}", &[table_guid]).await
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub async fn create_database_view(
        &self,
        database_asset_guid: Uuid,
        properties: &DatabaseViewProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/database-assets/{}/views",
            &[database_asset_guid],
            &[],
            properties,
        )
        .await
    }

    pub async fn create_database_view_from_template(
        &self,
        database_asset_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/database-assets/{}/views/from-template/{}",
            &[database_asset_guid, template_guid],
            &[],
            template,
        )
        .await
    }

    pub async fn update_database_view(
        &self,
        view_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseViewProperties,
    ) -> Result<(), OmagError> {
        self.update("/views/{}", &[view_guid], is_merge_update, properties)
            .await
    }

    pub async fn remove_database_view(&self, view_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/views/{}/delete", &[view_guid]).await
    }

    pub async fn find_database_views(
        &self,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        self.find("/views/by-search-string", search_string, paging).await
    }

    pub async fn get_database_views_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        self.by_name("/views/by-name", name, paging).await
    }

    pub async fn get_views_for_database_asset(
        &self,
        database_asset_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        self.list("/database-assets/{}/views", &[database_asset_guid], paging)
            .await
    }

    pub async fn get_database_view_by_guid(
        &self,
        view_guid: Uuid,
    ) -> Result<DatabaseViewElement, OmagError> {
        self.element("/views/{}", &[view_guid]).await
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    pub async fn create_database_column(
        &self,
        table_guid: Uuid,
        properties: &DatabaseColumnProperties,
    ) -> Result<Uuid, OmagError> {
        self.create("/tables/{}/columns", &[table_guid], &[], properties)
            .await
    }

    pub async fn create_database_column_from_template(
        &self,
        table_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        self.create(
            "/tables/{}/columns/from-template/{}",
            &[table_guid, template_guid],
            &[],
            template,
        )
        .await
    }

    pub async fn update_database_column(
        &self,
        column_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseColumnProperties,
    ) -> Result<(), OmagError> {
        self.update("/columns/{}", &[column_guid], is_merge_update, properties)
            .await
    }

    pub async fn remove_database_column(&self, column_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/columns/{}/delete", &[column_guid]).await
    }

    pub async fn find_database_columns(
        &self,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        self.find("/columns/by-search-string", search_string, paging).await
    }

    pub async fn get_database_columns_by_name(
        &self,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        self.by_name("/columns/by-name", name, paging).await
    }

    pub async fn get_columns_for_database_table(
        &self,
        table_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        self.list("/tables/{}/columns", &[table_guid], paging).await
    }

    pub async fn get_database_column_by_guid(
        &self,
        column_guid: Uuid,
    ) -> Result<DatabaseColumnElement, OmagError> {
        self.element("/columns/{}", &[column_guid]).await
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    pub async fn set_primary_key(
        &self,
        column_guid: Uuid,
        properties: &DatabasePrimaryKeyProperties,
    ) -> Result<(), OmagError> {
        let url = self.url("/columns/{}/primary-key", &[column_guid], &[])?;
        self.rest
            .post::<_, Void>(url, Some(&self.sourced(Some(properties))))
            .await?;
        Ok(())
    }

    pub async fn remove_primary_key(&self, column_guid: Uuid) -> Result<(), OmagError> {
        self.post_sourced("/columns/{}/primary-key/delete", &[column_guid])
            .await
    }

    /// Link `foreign_key_column_guid` to the primary key held by `primary_key_column_guid`.
    pub async fn add_foreign_key(
        &self,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
        properties: &DatabaseForeignKeyProperties,
    ) -> Result<(), OmagError> {
        let url = self.url(
            "/columns/{}/foreign-keys/{}",
            &[primary_key_column_guid, foreign_key_column_guid],
            &[],
        )?;
        self.rest
            .post::<_, Void>(url, Some(&self.sourced(Some(properties))))
            .await?;
        Ok(())
    }

    pub async fn update_foreign_key(
        &self,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
        properties: &DatabaseForeignKeyProperties,
    ) -> Result<(), OmagError> {
        let url = self.url(
            "/columns/{}/foreign-keys/{}/update",
            &[primary_key_column_guid, foreign_key_column_guid],
            &[],
        )?;
        self.rest
            .post::<_, Void>(url, Some(&self.sourced(Some(properties))))
            .await?;
        Ok(())
    }

    pub async fn remove_foreign_key(
        &self,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.post_sourced(
            "/columns/{}/foreign-keys/{}/delete",
            &[primary_key_column_guid, foreign_key_column_guid],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DatabaseManagerClient {
        DatabaseManagerClient::new(
            RestClient::new("http://localhost:9443").unwrap(),
            "cocoMDS1",
            "erinoverview",
        )
    }

    #[test]
    fn test_url_places_server_and_user() {
        let guid = Uuid::nil();
        let url = client()
            .url("/columns/{}/primary-key", &[guid], &[])
            .unwrap();
        assert_eq!(
            url.path(),
            format!(
                "/servers/cocoMDS1/open-metadata/access-services/data-manager/users/erinoverview/columns/{guid}/primary-key"
            )
        );
    }

    #[test]
    fn test_request_carries_external_source() {
        let source = ExternalSource {
            guid: Uuid::new_v4(),
            name: "coco-hr-postgres".into(),
        };
        let client = client().with_external_source(source.clone());
        let properties = DatabaseProperties {
            qualified_name: "coco.hr".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(client.sourced(Some(&properties))).unwrap();
        assert_eq!(json["external_source_guid"], source.guid.to_string());
        assert_eq!(json["external_source_name"], "coco-hr-postgres");
        assert_eq!(json["properties"]["qualified_name"], "coco.hr");

        let json = serde_json::to_value(client.sourced::<()>(None)).unwrap();
        assert!(json.get("properties").is_none());
    }

    #[test]
    fn test_request_without_source_is_bare() {
        let json = serde_json::to_value(client().sourced::<()>(None)).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
