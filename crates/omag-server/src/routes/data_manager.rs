//! Data Manager OMAS: lets an integration daemon publish the databases of the database
//! manager it watches.
//!
//! Every route resolves the server's data-manager instance first, so a stopped server, a
//! server without the service, or a user outside the server's allowed users is rejected
//! before the request is read any further.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};

use omag_core::OmagError;
use omag_core::instances::ExternalSource;
use omag_core::operations::DataManagerInstance;
use omag_core::validation::{validate_guid, validate_name, validate_object};

use super::optional_body;
use crate::dto::{
    DatabaseColumnRequest, DatabaseColumnResponse, DatabaseColumnsResponse,
    DatabaseManagerRequest, DatabaseManagerResponse, DatabaseRequest, DatabaseResponse,
    DatabaseSchemaRequest, DatabaseSchemaResponse, DatabaseSchemasResponse, DatabaseTableRequest,
    DatabaseTableResponse, DatabaseTablesResponse, DatabaseViewRequest, DatabaseViewResponse,
    DatabaseViewsResponse, DatabasesResponse, ForeignKeyPath, ForeignKeyRequest, GuidPath,
    GuidResponse, MetadataSourceRequest, NameRequest, PagingQuery, ParentTemplatePath,
    PrimaryKeyRequest, QualifiedNamePath, SchemaQuery, SearchStringRequest, ServerPath,
    TemplatePath, TemplateRequest, UpdateQuery, VoidResponse,
};
use crate::error::ApiError;
use crate::extract::{Json, Query};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/database-managers", post(create_database_manager))
        .route("/database-managers/{guid}", get(get_database_manager))
        .route(
            "/metadata-sources/by-name/{qualified_name}",
            get(get_metadata_source_guid),
        )
        // Databases
        .route("/databases", post(create_database))
        .route(
            "/databases/from-template/{template_guid}",
            post(create_database_from_template),
        )
        .route("/databases/by-search-string", post(find_databases))
        .route("/databases/by-name", post(get_databases_by_name))
        .route(
            "/databases/by-database-manager/{guid}",
            get(get_databases_for_database_manager),
        )
        .route(
            "/databases/{guid}",
            get(get_database_by_guid).post(update_database),
        )
        .route("/databases/{guid}/publish", post(publish_database))
        .route("/databases/{guid}/withdraw", post(withdraw_database))
        .route("/databases/{guid}/delete", post(remove_database))
        .route("/databases/{guid}/schemas", get(get_schemas_for_database))
        // Schemas
        .route("/schemas", post(create_database_schema))
        .route(
            "/schemas/from-template/{template_guid}",
            post(create_database_schema_from_template),
        )
        .route("/schemas/by-search-string", post(find_database_schemas))
        .route("/schemas/by-name", post(get_database_schemas_by_name))
        .route(
            "/schemas/{guid}",
            get(get_database_schema_by_guid).post(update_database_schema),
        )
        .route("/schemas/{guid}/publish", post(publish_database_schema))
        .route("/schemas/{guid}/withdraw", post(withdraw_database_schema))
        .route("/schemas/{guid}/delete", post(remove_database_schema))
        // Tables and views
        .route(
            "/database-assets/{guid}/tables",
            get(get_tables_for_database_asset).post(create_database_table),
        )
        .route(
            "/database-assets/{guid}/tables/from-template/{template_guid}",
            post(create_database_table_from_template),
        )
        .route(
            "/database-assets/{guid}/views",
            get(get_views_for_database_asset).post(create_database_view),
        )
        .route(
            "/database-assets/{guid}/views/from-template/{template_guid}",
            post(create_database_view_from_template),
        )
        .route("/tables/by-search-string", post(find_database_tables))
        .route("/tables/by-name", post(get_database_tables_by_name))
        .route(
            "/tables/{guid}",
            get(get_database_table_by_guid).post(update_database_table),
        )
        .route("/tables/{guid}/delete", post(remove_database_table))
        .route("/views/by-search-string", post(find_database_views))
        .route("/views/by-name", post(get_database_views_by_name))
        .route(
            "/views/{guid}",
            get(get_database_view_by_guid).post(update_database_view),
        )
        .route("/views/{guid}/delete", post(remove_database_view))
        // Columns and keys
        .route(
            "/tables/{guid}/columns",
            get(get_columns_for_database_table).post(create_database_column),
        )
        .route(
            "/tables/{guid}/columns/from-template/{template_guid}",
            post(create_database_column_from_template),
        )
        .route("/columns/by-search-string", post(find_database_columns))
        .route("/columns/by-name", post(get_database_columns_by_name))
        .route(
            "/columns/{guid}",
            get(get_database_column_by_guid).post(update_database_column),
        )
        .route("/columns/{guid}/delete", post(remove_database_column))
        .route("/columns/{guid}/primary-key", post(set_primary_key))
        .route(
            "/columns/{guid}/primary-key/delete",
            post(remove_primary_key),
        )
        .route(
            "/columns/{guid}/foreign-keys/{foreign_key_guid}",
            post(add_foreign_key),
        )
        .route(
            "/columns/{guid}/foreign-keys/{foreign_key_guid}/update",
            post(update_foreign_key),
        )
        .route(
            "/columns/{guid}/foreign-keys/{foreign_key_guid}/delete",
            post(remove_foreign_key),
        )
}

/// The integration daemon named on a request, if any.
async fn external_source(
    dm: &DataManagerInstance,
    guid: Option<String>,
    name: Option<String>,
) -> Result<Option<ExternalSource>, OmagError> {
    dm.metadata_sources
        .resolve_external_source(guid.as_deref(), name.as_deref())
        .await
}

fn ok() -> axum::Json<VoidResponse> {
    axum::Json(VoidResponse::ok())
}

// ---------------------------------------------------------------------------
// Database managers
// ---------------------------------------------------------------------------

/// Register the database manager an integration daemon catalogues. The returned GUID
/// identifies the daemon as the external source of everything it publishes.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-managers",
    params(ServerPath),
    request_body = DatabaseManagerRequest,
    responses(
        (status = 200, description = "Database manager registered", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_manager(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<DatabaseManagerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let guid = dm
        .metadata_sources
        .create_database_manager(&path.user_id, &properties)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-managers/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The database manager", body = DatabaseManagerResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_manager(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let guid = validate_guid(&path.guid, "database_manager_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm
        .metadata_sources
        .get_database_manager(&path.user_id, guid)
        .await?;
    Ok(axum::Json(DatabaseManagerResponse { element }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/metadata-sources/by-name/{qualified_name}",
    params(QualifiedNamePath),
    responses(
        (status = 200, description = "GUID of the metadata source", body = GuidResponse),
        (status = 400, description = "No metadata source has the name", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_metadata_source_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<QualifiedNamePath>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&path.qualified_name, "qualified_name")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let guid = dm
        .metadata_sources
        .get_metadata_source_guid(&path.user_id, &path.qualified_name)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

// ---------------------------------------------------------------------------
// Databases
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases",
    params(ServerPath),
    request_body = DatabaseRequest,
    responses(
        (status = 200, description = "Database created", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<DatabaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database(&path.user_id, source.as_ref(), &properties)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/from-template/{template_guid}",
    params(TemplatePath),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Database copied from the template", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_from_template(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TemplatePath>,
    Json(body): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = validate_object(body.properties, "properties")?;
    let template_guid = validate_guid(&path.template_guid, "template_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_from_template(&path.user_id, source.as_ref(), template_guid, &template)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}",
    params(GuidPath, UpdateQuery),
    request_body = DatabaseRequest,
    responses(
        (status = 200, description = "Database updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(query): Query<UpdateQuery>,
    Json(body): Json<DatabaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_database(
            &path.user_id,
            source.as_ref(),
            database_guid,
            query.is_merge_update,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}/publish",
    params(GuidPath),
    responses(
        (status = 200, description = "Database moved into the publish zones", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn publish_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    dm.databases.publish_database(&path.user_id, database_guid).await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}/withdraw",
    params(GuidPath),
    responses(
        (status = 200, description = "Database returned to the default zones", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn withdraw_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    dm.databases.withdraw_database(&path.user_id, database_guid).await?;
    Ok(ok())
}

/// Remove a database along with the tables, views and columns anchored to it.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Database removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_database(&path.user_id, source.as_ref(), database_guid)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/by-search-string",
    params(ServerPath, PagingQuery),
    request_body = SearchStringRequest,
    responses(
        (status = 200, description = "Matching databases", body = DatabasesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn find_databases(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<SearchStringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .find_databases(&path.user_id, &body.search_string, paging.into())
        .await?;
    Ok(axum::Json(DatabasesResponse { elements }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/by-name",
    params(ServerPath, PagingQuery),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Databases with the name", body = DatabasesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_databases_by_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_databases_by_name(&path.user_id, &body.name, paging.into())
        .await?;
    Ok(axum::Json(DatabasesResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/by-database-manager/{guid}",
    params(GuidPath, PagingQuery),
    responses(
        (status = 200, description = "Databases hosted by the database manager", body = DatabasesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_databases_for_database_manager(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(paging): Query<PagingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let database_manager_guid = validate_guid(&path.guid, "database_manager_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_databases_for_database_manager(&path.user_id, database_manager_guid, paging.into())
        .await?;
    Ok(axum::Json(DatabasesResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The database", body = DatabaseResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_by_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm.databases.get_database_by_guid(&path.user_id, database_guid).await?;
    Ok(axum::Json(DatabaseResponse { element }))
}
// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Create a schema, attached to the database named by `database_guid` when one is given.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas",
    params(ServerPath, SchemaQuery),
    request_body = DatabaseSchemaRequest,
    responses(
        (status = 200, description = "Schema created", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_schema(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(query): Query<SchemaQuery>,
    Json(body): Json<DatabaseSchemaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let database_guid = query
        .database_guid
        .as_deref()
        .map(|guid| validate_guid(guid, "database_guid"))
        .transpose()?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_schema(&path.user_id, source.as_ref(), database_guid, &properties)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/from-template/{template_guid}",
    params(TemplatePath, SchemaQuery),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Schema copied from the template", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_schema_from_template(
    State(state): State<Arc<AppState>>,
    Path(path): Path<TemplatePath>,
    Query(query): Query<SchemaQuery>,
    Json(body): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = validate_object(body.properties, "properties")?;
    let template_guid = validate_guid(&path.template_guid, "template_guid")?;
    let database_guid = query
        .database_guid
        .as_deref()
        .map(|guid| validate_guid(guid, "database_guid"))
        .transpose()?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_schema_from_template(
            &path.user_id,
            source.as_ref(),
            database_guid,
            template_guid,
            &template,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/{guid}",
    params(GuidPath, UpdateQuery),
    request_body = DatabaseSchemaRequest,
    responses(
        (status = 200, description = "Schema updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_database_schema(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(query): Query<UpdateQuery>,
    Json(body): Json<DatabaseSchemaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let schema_guid = validate_guid(&path.guid, "schema_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_database_schema(
            &path.user_id,
            source.as_ref(),
            schema_guid,
            query.is_merge_update,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/{guid}/publish",
    params(GuidPath),
    responses(
        (status = 200, description = "Schema moved into the publish zones", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn publish_database_schema(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let schema_guid = validate_guid(&path.guid, "schema_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    dm.databases.publish_database_schema(&path.user_id, schema_guid).await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/{guid}/withdraw",
    params(GuidPath),
    responses(
        (status = 200, description = "Schema returned to the default zones", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn withdraw_database_schema(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let schema_guid = validate_guid(&path.guid, "schema_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    dm.databases.withdraw_database_schema(&path.user_id, schema_guid).await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/{guid}/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Schema removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_database_schema(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let schema_guid = validate_guid(&path.guid, "schema_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_database_schema(&path.user_id, source.as_ref(), schema_guid)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/by-search-string",
    params(ServerPath, PagingQuery),
    request_body = SearchStringRequest,
    responses(
        (status = 200, description = "Matching schemas", body = DatabaseSchemasResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn find_database_schemas(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<SearchStringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .find_database_schemas(&path.user_id, &body.search_string, paging.into())
        .await?;
    Ok(axum::Json(DatabaseSchemasResponse { elements }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/by-name",
    params(ServerPath, PagingQuery),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Schemas with the name", body = DatabaseSchemasResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_schemas_by_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_database_schemas_by_name(&path.user_id, &body.name, paging.into())
        .await?;
    Ok(axum::Json(DatabaseSchemasResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases/{guid}/schemas",
    params(GuidPath, PagingQuery),
    responses(
        (status = 200, description = "Schemas of the database", body = DatabaseSchemasResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_schemas_for_database(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(paging): Query<PagingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let database_guid = validate_guid(&path.guid, "database_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_schemas_for_database(&path.user_id, database_guid, paging.into())
        .await?;
    Ok(axum::Json(DatabaseSchemasResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/schemas/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The schema", body = DatabaseSchemaResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_schema_by_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let schema_guid = validate_guid(&path.guid, "schema_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm.databases.get_database_schema_by_guid(&path.user_id, schema_guid).await?;
    Ok(axum::Json(DatabaseSchemaResponse { element }))
}
// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Create a table in a database or schema.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/tables",
    params(GuidPath),
    request_body = DatabaseTableRequest,
    responses(
        (status = 200, description = "Table created", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_table(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Json(body): Json<DatabaseTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_table(
            &path.user_id,
            source.as_ref(),
            database_asset_guid,
            &properties,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/tables/from-template/{template_guid}",
    params(ParentTemplatePath),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Table copied from the template", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_table_from_template(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ParentTemplatePath>,
    Json(body): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = validate_object(body.properties, "properties")?;
    let template_guid = validate_guid(&path.template_guid, "template_guid")?;
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_table_from_template(
            &path.user_id,
            source.as_ref(),
            database_asset_guid,
            template_guid,
            &template,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}",
    params(GuidPath, UpdateQuery),
    request_body = DatabaseTableRequest,
    responses(
        (status = 200, description = "Table updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_database_table(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(query): Query<UpdateQuery>,
    Json(body): Json<DatabaseTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_database_table(
            &path.user_id,
            source.as_ref(),
            table_guid,
            query.is_merge_update,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Table removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_database_table(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_database_table(&path.user_id, source.as_ref(), table_guid)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/by-search-string",
    params(ServerPath, PagingQuery),
    request_body = SearchStringRequest,
    responses(
        (status = 200, description = "Matching tables", body = DatabaseTablesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn find_database_tables(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<SearchStringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .find_database_tables(&path.user_id, &body.search_string, paging.into())
        .await?;
    Ok(axum::Json(DatabaseTablesResponse { elements }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/by-name",
    params(ServerPath, PagingQuery),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Tables with the name", body = DatabaseTablesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_tables_by_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_database_tables_by_name(&path.user_id, &body.name, paging.into())
        .await?;
    Ok(axum::Json(DatabaseTablesResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/tables",
    params(GuidPath, PagingQuery),
    responses(
        (status = 200, description = "Tables of the database or schema", body = DatabaseTablesResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_tables_for_database_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(paging): Query<PagingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_tables_for_database_asset(&path.user_id, database_asset_guid, paging.into())
        .await?;
    Ok(axum::Json(DatabaseTablesResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The table", body = DatabaseTableResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_table_by_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm.databases.get_database_table_by_guid(&path.user_id, table_guid).await?;
    Ok(axum::Json(DatabaseTableResponse { element }))
}
// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/views",
    params(GuidPath),
    request_body = DatabaseViewRequest,
    responses(
        (status = 200, description = "View created", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_view(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Json(body): Json<DatabaseViewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_view(
            &path.user_id,
            source.as_ref(),
            database_asset_guid,
            &properties,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/views/from-template/{template_guid}",
    params(ParentTemplatePath),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "View copied from the template", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_view_from_template(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ParentTemplatePath>,
    Json(body): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = validate_object(body.properties, "properties")?;
    let template_guid = validate_guid(&path.template_guid, "template_guid")?;
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_view_from_template(
            &path.user_id,
            source.as_ref(),
            database_asset_guid,
            template_guid,
            &template,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/views/{guid}",
    params(GuidPath, UpdateQuery),
    request_body = DatabaseViewRequest,
    responses(
        (status = 200, description = "View updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_database_view(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(query): Query<UpdateQuery>,
    Json(body): Json<DatabaseViewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let view_guid = validate_guid(&path.guid, "view_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_database_view(
            &path.user_id,
            source.as_ref(),
            view_guid,
            query.is_merge_update,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/views/{guid}/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "View removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_database_view(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let view_guid = validate_guid(&path.guid, "view_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_database_view(&path.user_id, source.as_ref(), view_guid)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/views/by-search-string",
    params(ServerPath, PagingQuery),
    request_body = SearchStringRequest,
    responses(
        (status = 200, description = "Matching views", body = DatabaseViewsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn find_database_views(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<SearchStringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .find_database_views(&path.user_id, &body.search_string, paging.into())
        .await?;
    Ok(axum::Json(DatabaseViewsResponse { elements }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/views/by-name",
    params(ServerPath, PagingQuery),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Views with the name", body = DatabaseViewsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_views_by_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_database_views_by_name(&path.user_id, &body.name, paging.into())
        .await?;
    Ok(axum::Json(DatabaseViewsResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/database-assets/{guid}/views",
    params(GuidPath, PagingQuery),
    responses(
        (status = 200, description = "Views of the database or schema", body = DatabaseViewsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_views_for_database_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(paging): Query<PagingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let database_asset_guid = validate_guid(&path.guid, "database_asset_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_views_for_database_asset(&path.user_id, database_asset_guid, paging.into())
        .await?;
    Ok(axum::Json(DatabaseViewsResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/views/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The view", body = DatabaseViewResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_view_by_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let view_guid = validate_guid(&path.guid, "view_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm.databases.get_database_view_by_guid(&path.user_id, view_guid).await?;
    Ok(axum::Json(DatabaseViewResponse { element }))
}
// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}/columns",
    params(GuidPath),
    request_body = DatabaseColumnRequest,
    responses(
        (status = 200, description = "Column created", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_column(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Json(body): Json<DatabaseColumnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_column(&path.user_id, source.as_ref(), table_guid, &properties)
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}/columns/from-template/{template_guid}",
    params(ParentTemplatePath),
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Column copied from the template", body = GuidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn create_database_column_from_template(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ParentTemplatePath>,
    Json(body): Json<TemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let template = validate_object(body.properties, "properties")?;
    let template_guid = validate_guid(&path.template_guid, "template_guid")?;
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    let guid = dm
        .databases
        .create_database_column_from_template(
            &path.user_id,
            source.as_ref(),
            table_guid,
            template_guid,
            &template,
        )
        .await?;
    Ok(axum::Json(GuidResponse { guid }))
}

/// Columns keep their primary and foreign keys across updates.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}",
    params(GuidPath, UpdateQuery),
    request_body = DatabaseColumnRequest,
    responses(
        (status = 200, description = "Column updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_database_column(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(query): Query<UpdateQuery>,
    Json(body): Json<DatabaseColumnRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let column_guid = validate_guid(&path.guid, "column_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_database_column(
            &path.user_id,
            source.as_ref(),
            column_guid,
            query.is_merge_update,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Column removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_database_column(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let column_guid = validate_guid(&path.guid, "column_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_database_column(&path.user_id, source.as_ref(), column_guid)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/by-search-string",
    params(ServerPath, PagingQuery),
    request_body = SearchStringRequest,
    responses(
        (status = 200, description = "Matching columns", body = DatabaseColumnsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn find_database_columns(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<SearchStringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .find_database_columns(&path.user_id, &body.search_string, paging.into())
        .await?;
    Ok(axum::Json(DatabaseColumnsResponse { elements }))
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/by-name",
    params(ServerPath, PagingQuery),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Columns with the name", body = DatabaseColumnsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_columns_by_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(paging): Query<PagingQuery>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_database_columns_by_name(&path.user_id, &body.name, paging.into())
        .await?;
    Ok(axum::Json(DatabaseColumnsResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/tables/{guid}/columns",
    params(GuidPath, PagingQuery),
    responses(
        (status = 200, description = "Columns of the table or view", body = DatabaseColumnsResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_columns_for_database_table(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Query(paging): Query<PagingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let table_guid = validate_guid(&path.guid, "table_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let elements = dm
        .databases
        .get_columns_for_database_table(&path.user_id, table_guid, paging.into())
        .await?;
    Ok(axum::Json(DatabaseColumnsResponse { elements }))
}

#[utoipa::path(
    get,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}",
    params(GuidPath),
    responses(
        (status = 200, description = "The column", body = DatabaseColumnResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn get_database_column_by_guid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
) -> Result<impl IntoResponse, ApiError> {
    let column_guid = validate_guid(&path.guid, "column_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let element = dm.databases.get_database_column_by_guid(&path.user_id, column_guid).await?;
    Ok(axum::Json(DatabaseColumnResponse { element }))
}

// ---------------------------------------------------------------------------
// Primary and foreign keys
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/primary-key",
    params(GuidPath),
    request_body = PrimaryKeyRequest,
    responses(
        (status = 200, description = "Column marked as the primary key", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn set_primary_key(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    Json(body): Json<PrimaryKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let column_guid = validate_guid(&path.guid, "column_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .set_primary_key(&path.user_id, source.as_ref(), column_guid, &properties)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/primary-key/delete",
    params(GuidPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Primary key removed", body = VoidResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_primary_key(
    State(state): State<Arc<AppState>>,
    Path(path): Path<GuidPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let column_guid = validate_guid(&path.guid, "column_guid")?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_primary_key(&path.user_id, source.as_ref(), column_guid)
        .await?;
    Ok(ok())
}

/// Link a foreign key column to the column holding the primary key it refers to.
#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/foreign-keys/{foreign_key_guid}",
    params(ForeignKeyPath),
    request_body = ForeignKeyRequest,
    responses(
        (status = 200, description = "Foreign key added", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn add_foreign_key(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ForeignKeyPath>,
    Json(body): Json<ForeignKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let (primary_key_column_guid, foreign_key_column_guid) = key_columns(&path)?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .add_foreign_key(
            &path.user_id,
            source.as_ref(),
            primary_key_column_guid,
            foreign_key_column_guid,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/foreign-keys/{foreign_key_guid}/update",
    params(ForeignKeyPath),
    request_body = ForeignKeyRequest,
    responses(
        (status = 200, description = "Foreign key updated", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn update_foreign_key(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ForeignKeyPath>,
    Json(body): Json<ForeignKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let properties = validate_object(body.properties, "properties")?;
    let (primary_key_column_guid, foreign_key_column_guid) = key_columns(&path)?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .update_foreign_key(
            &path.user_id,
            source.as_ref(),
            primary_key_column_guid,
            foreign_key_column_guid,
            &properties,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/columns/{guid}/foreign-keys/{foreign_key_guid}/delete",
    params(ForeignKeyPath),
    request_body = MetadataSourceRequest,
    responses(
        (status = 200, description = "Foreign key removed", body = VoidResponse),
        (status = 400, description = "Invalid parameter", body = crate::dto::ErrorResponse),
        (status = 404, description = "Element, server or service not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "data-manager"
)]
pub async fn remove_foreign_key(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ForeignKeyPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: MetadataSourceRequest = optional_body(&body)?;
    let (primary_key_column_guid, foreign_key_column_guid) = key_columns(&path)?;
    let dm = state.data_manager(&path.server_name, &path.user_id).await?;
    let source = external_source(&dm, body.external_source_guid, body.external_source_name).await?;
    dm.databases
        .remove_foreign_key(
            &path.user_id,
            source.as_ref(),
            primary_key_column_guid,
            foreign_key_column_guid,
        )
        .await?;
    Ok(ok())
}

fn key_columns(path: &ForeignKeyPath) -> Result<(uuid::Uuid, uuid::Uuid), OmagError> {
    Ok((
        validate_guid(&path.guid, "primary_key_column_guid")?,
        validate_guid(&path.foreign_key_guid, "foreign_key_column_guid")?,
    ))
}
