use serde::{Deserialize, Serialize};
use uuid::Uuid;

use omag_core::admin::config::{
    AccessServiceConfig, EngineServiceConfig, OmagServerConfig, ServiceOptions, ViewServiceConfig,
};
use omag_core::admin::registration::RegisteredService;
use omag_core::audit::AuditLogRecord;
use omag_core::elements::{
    DatabaseColumnElement, DatabaseElement, DatabaseManagerElement, DatabaseSchemaElement,
    DatabaseTableElement, DatabaseViewElement,
};
use omag_core::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, DatabaseViewProperties, TemplateProperties,
};
use omag_core::operations::ServerStatus;
use omag_core::{Paging, ServerType};

// ---------------------------------------------------------------------------
// Path parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct PlatformPath {
    /// Calling user
    pub user_id: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ServerPath {
    pub user_id: String,
    pub server_name: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ServerValuePath {
    pub user_id: String,
    pub server_name: String,
    /// Name, marker or value addressed by the route
    pub value: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct GuidPath {
    pub server_name: String,
    pub user_id: String,
    /// Unique identifier of the element
    pub guid: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct TemplatePath {
    pub server_name: String,
    pub user_id: String,
    /// Unique identifier of the template element to copy
    pub template_guid: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ParentTemplatePath {
    pub server_name: String,
    pub user_id: String,
    /// Unique identifier of the parent element
    pub guid: String,
    pub template_guid: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ForeignKeyPath {
    pub server_name: String,
    pub user_id: String,
    /// Column holding the primary key
    pub guid: String,
    /// Column holding the foreign key
    pub foreign_key_guid: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct QualifiedNamePath {
    pub server_name: String,
    pub user_id: String,
    pub qualified_name: String,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
pub struct PagingQuery {
    /// Offset of the first result
    pub start_from: usize,
    /// Maximum results to return; 0 uses the server's maximum page size
    pub page_size: usize,
}

impl From<PagingQuery> for Paging {
    fn from(query: PagingQuery) -> Self {
        Paging::new(query.start_from, query.page_size)
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
pub struct UpdateQuery {
    /// Overlay the supplied properties on the stored ones instead of replacing them
    pub is_merge_update: bool,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
pub struct SchemaQuery {
    /// Database the schema belongs to
    pub database_guid: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
pub struct ServerTypeQuery {
    pub type_name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UrlQuery {
    pub url: String,
}

// ---------------------------------------------------------------------------
// Data manager requests
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseManagerRequest {
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseManagerProperties>,
}

/// Identifies the integration daemon issuing a request.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct MetadataSourceRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseSchemaRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseSchemaProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseTableRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseTableProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseViewRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseViewProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DatabaseColumnRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseColumnProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct PrimaryKeyRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabasePrimaryKeyProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ForeignKeyRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<DatabaseForeignKeyProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct TemplateRequest {
    pub external_source_guid: Option<String>,
    pub external_source_name: Option<String>,
    #[schema(value_type = Object)]
    pub properties: Option<TemplateProperties>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct SearchStringRequest {
    /// Regular expression matched against the element's names and description
    pub search_string: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct NameRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Data manager responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GuidResponse {
    pub guid: Uuid,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoidResponse {
    pub related_http_code: u16,
}

impl VoidResponse {
    pub fn ok() -> Self {
        Self {
            related_http_code: 200,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseManagerResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseManagerElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabasesResponse {
    #[schema(value_type = Vec<Object>)]
    pub elements: Vec<DatabaseElement>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseSchemaResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseSchemaElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseSchemasResponse {
    #[schema(value_type = Vec<Object>)]
    pub elements: Vec<DatabaseSchemaElement>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseTableResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseTableElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseTablesResponse {
    #[schema(value_type = Vec<Object>)]
    pub elements: Vec<DatabaseTableElement>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseViewResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseViewElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseViewsResponse {
    #[schema(value_type = Vec<Object>)]
    pub elements: Vec<DatabaseViewElement>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseColumnResponse {
    #[schema(value_type = Object)]
    pub element: DatabaseColumnElement,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DatabaseColumnsResponse {
    #[schema(value_type = Vec<Object>)]
    pub elements: Vec<DatabaseColumnElement>,
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServerConfigResponse {
    #[schema(value_type = Object)]
    pub omag_server_config: OmagServerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct PostgresRepositoryRequest {
    pub connection_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RemoteServerRequest {
    pub omag_server_name: String,
    pub omag_server_platform_root_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct EngineServiceRequest {
    /// Qualified names of the governance engines to run
    pub engines: Vec<String>,
    #[schema(value_type = Object)]
    pub options: ServiceOptions,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RepositoryWorkbenchRequest {
    pub tut_repository_server_name: String,
    pub max_search_results: usize,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct PlatformWorkbenchRequest {
    pub tut_platform_url: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessServicesResponse {
    #[schema(value_type = Vec<Object>)]
    pub services: Vec<AccessServiceConfig>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ViewServicesResponse {
    #[schema(value_type = Vec<Object>)]
    pub services: Vec<ViewServiceConfig>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EngineServicesResponse {
    #[schema(value_type = Vec<Object>)]
    pub services: Vec<EngineServiceConfig>,
}

// ---------------------------------------------------------------------------
// Operations and platform
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuccessMessageResponse {
    pub success_message: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServerStatusResponse {
    pub server_name: String,
    pub server_type: Option<String>,
    pub is_active: bool,
    pub server_start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub server_end_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ServerStatus> for ServerStatusResponse {
    fn from(status: ServerStatus) -> Self {
        Self {
            server_name: status.server_name,
            server_type: status.server_type.as_ref().map(ServerType::to_string),
            is_active: status.is_active,
            server_start_time: status.server_start_time,
            server_end_time: status.server_end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServerListResponse {
    pub server_list: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceListResponse {
    pub services: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuditLogResponse {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<AuditLogRecord>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisteredServicesResponse {
    #[schema(value_type = Vec<Object>)]
    pub services: Vec<RegisteredService>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PlatformOriginResponse {
    pub origin: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_servers: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// First-failure data capture returned with every failed request.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub related_http_code: u16,
    pub exception_class_name: String,
    pub action_description: String,
    pub parameter_name: Option<String>,
}
