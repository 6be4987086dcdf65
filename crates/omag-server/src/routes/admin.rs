//! Administration services: build and store the configuration document of each server.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};

use omag_core::OmagError;
use omag_core::admin::{
    CohortConfig, EventBusConfig, OmagServerConfig, ServerSecurityConfig, ServiceOptions,
    ViewServiceRequest,
};
use omag_core::audit::AuditLogDestinationConfig;

use super::optional_body;
use crate::dto::{
    AccessServicesResponse, EngineServiceRequest, EngineServicesResponse, PlatformPath,
    PlatformWorkbenchRequest, PostgresRepositoryRequest, RemoteServerRequest,
    RepositoryWorkbenchRequest, ServerConfigResponse, ServerListResponse, ServerPath,
    ServerTypeQuery, ServerValuePath, UrlQuery, ViewServicesResponse, VoidResponse,
};
use crate::error::ApiError;
use crate::extract::{Json, Query};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stored-configurations", get(list_stored_configurations))
        .route(
            "/servers/{server_name}/configuration",
            get(get_stored_configuration)
                .post(set_omag_server_config)
                .delete(clear_omag_server_config),
        )
        // Basic properties
        .route("/servers/{server_name}/server-type", post(set_server_type))
        .route(
            "/servers/{server_name}/organization-name/{value}",
            post(set_organization_name),
        )
        .route(
            "/servers/{server_name}/server-url-root",
            post(set_server_url_root),
        )
        .route(
            "/servers/{server_name}/server-user-id/{value}",
            post(set_server_user_id),
        )
        .route(
            "/servers/{server_name}/server-user-password/{value}",
            post(set_server_password),
        )
        .route(
            "/servers/{server_name}/max-page-size/{value}",
            post(set_max_page_size),
        )
        // Event bus and security
        .route(
            "/servers/{server_name}/event-bus",
            post(set_event_bus).delete(clear_event_bus),
        )
        .route(
            "/servers/{server_name}/security",
            post(set_server_security).delete(clear_server_security),
        )
        // Audit log
        .route(
            "/servers/{server_name}/audit-log-destinations/default",
            post(set_default_audit_log),
        )
        .route(
            "/servers/{server_name}/audit-log-destinations",
            post(add_audit_log_destination).delete(clear_audit_log_destinations),
        )
        // Local repository and cohorts
        .route(
            "/servers/{server_name}/local-repository/mode/in-memory-repository",
            post(set_in_memory_local_repository),
        )
        .route(
            "/servers/{server_name}/local-repository/mode/postgres-repository",
            post(set_postgres_local_repository),
        )
        .route(
            "/servers/{server_name}/local-repository",
            axum::routing::delete(set_no_repository_mode),
        )
        .route(
            "/servers/{server_name}/local-repository/metadata-collection-name/{value}",
            post(set_local_metadata_collection_name),
        )
        .route(
            "/servers/{server_name}/cohorts/{value}",
            post(add_cohort_registration).delete(clear_cohort_registration),
        )
        // Access services
        .route(
            "/servers/{server_name}/access-services",
            get(get_access_services)
                .post(enable_all_access_services)
                .delete(disable_access_services),
        )
        .route(
            "/servers/{server_name}/access-services/{value}",
            post(enable_access_service).delete(disable_access_service),
        )
        // View services
        .route(
            "/servers/{server_name}/view-services",
            get(get_view_services).delete(disable_view_services),
        )
        .route(
            "/servers/{server_name}/view-services/{value}",
            post(enable_view_service).delete(disable_view_service),
        )
        // Engine host
        .route(
            "/servers/{server_name}/engine-definitions/client-config",
            post(set_engine_definitions_client_config),
        )
        .route(
            "/servers/{server_name}/engine-services",
            get(get_engine_services).delete(clear_engine_host_services),
        )
        .route(
            "/servers/{server_name}/engine-services/{value}",
            post(configure_engine_service).delete(disable_engine_service),
        )
        // Conformance suite
        .route(
            "/servers/{server_name}/conformance-suite-workbenches/repository-workbench/repositories",
            post(enable_repository_conformance_workbench),
        )
        .route(
            "/servers/{server_name}/conformance-suite-workbenches/platform-workbench/platforms",
            post(enable_platform_conformance_workbench),
        )
        .route(
            "/servers/{server_name}/conformance-suite-workbenches",
            axum::routing::delete(disable_conformance_suite_services),
        )
}

fn ok() -> axum::Json<VoidResponse> {
    axum::Json(VoidResponse::ok())
}

// ---------------------------------------------------------------------------
// Configuration documents
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/stored-configurations",
    params(PlatformPath),
    responses(
        (status = 200, description = "Servers with a stored configuration", body = ServerListResponse),
        (status = 403, description = "Not a platform administrator", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_stored_configurations(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    let server_list = state
        .configuration
        .list_stored_configurations(&path.user_id)
        .await?;
    Ok(axum::Json(ServerListResponse { server_list }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/configuration",
    params(ServerPath),
    responses(
        (status = 200, description = "Stored configuration, or a new default document", body = ServerConfigResponse),
        (status = 403, description = "Not a platform administrator", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_stored_configuration(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let omag_server_config = state
        .configuration
        .get_stored_configuration(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(ServerConfigResponse { omag_server_config }))
}

/// Replace the whole configuration document.
#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/configuration",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Configuration stored", body = VoidResponse),
        (status = 400, description = "Invalid configuration", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_omag_server_config(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(config): Json<OmagServerConfig>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_omag_server_config(&path.user_id, &path.server_name, config)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/configuration",
    params(ServerPath),
    responses(
        (status = 200, description = "Configuration removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_omag_server_config(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_omag_server_config(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

// ---------------------------------------------------------------------------
// Basic properties
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/server-type",
    params(ServerPath, ServerTypeQuery),
    responses(
        (status = 200, description = "Server type set; omit type_name to derive it", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_server_type(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(query): Query<ServerTypeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_server_type(&path.user_id, &path.server_name, query.type_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/organization-name/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Organization name set", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_organization_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_organization_name(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/server-url-root",
    params(ServerPath, UrlQuery),
    responses(
        (status = 200, description = "URL root set", body = VoidResponse),
        (status = 400, description = "Invalid URL", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_server_url_root(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Query(query): Query<UrlQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_server_url_root(&path.user_id, &path.server_name, &query.url)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/server-user-id/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Server user id set", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_server_user_id(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_server_user_id(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/server-user-password/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Server password set", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_server_password(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_server_password(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/max-page-size/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Maximum page size set", body = VoidResponse),
        (status = 400, description = "Not a page size", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_max_page_size(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    let max_page_size: usize = path.value.parse().map_err(|_| {
        OmagError::invalid_parameter(
            "max_page_size",
            format!("'{}' is not a non-negative number", path.value),
        )
    })?;
    state
        .configuration
        .set_max_page_size(&path.user_id, &path.server_name, max_page_size)
        .await?;
    Ok(ok())
}

// ---------------------------------------------------------------------------
// Event bus and security
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/event-bus",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Event bus set; an empty body uses the defaults", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_event_bus(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let event_bus: EventBusConfig = optional_body(&body)?;
    state
        .configuration
        .set_event_bus(&path.user_id, &path.server_name, event_bus)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/event-bus",
    params(ServerPath),
    responses(
        (status = 200, description = "Event bus removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_event_bus(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_event_bus(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/security",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Allowed users set", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_server_security(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(security): Json<ServerSecurityConfig>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_server_security(&path.user_id, &path.server_name, security)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/security",
    params(ServerPath),
    responses(
        (status = 200, description = "Server open to every user", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_server_security(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_server_security(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/audit-log-destinations/default",
    params(ServerPath),
    responses(
        (status = 200, description = "Audit log writes to the console only", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_default_audit_log(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_default_audit_log(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/audit-log-destinations",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Destination added", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn add_audit_log_destination(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(destination): Json<AuditLogDestinationConfig>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .add_audit_log_destination(&path.user_id, &path.server_name, destination)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/audit-log-destinations",
    params(ServerPath),
    responses(
        (status = 200, description = "Destinations removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_audit_log_destinations(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_audit_log_destinations(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

// ---------------------------------------------------------------------------
// Local repository and cohorts
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/local-repository/mode/in-memory-repository",
    params(ServerPath),
    responses(
        (status = 200, description = "In-memory repository configured", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_in_memory_local_repository(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_in_memory_local_repository(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/local-repository/mode/postgres-repository",
    params(ServerPath),
    request_body = PostgresRepositoryRequest,
    responses(
        (status = 200, description = "PostgreSQL repository configured", body = VoidResponse),
        (status = 400, description = "Invalid connection URL", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_postgres_local_repository(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<PostgresRepositoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_postgres_local_repository(&path.user_id, &path.server_name, &body.connection_url)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/local-repository",
    params(ServerPath),
    responses(
        (status = 200, description = "Local repository removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_no_repository_mode(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_no_repository_mode(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/local-repository/metadata-collection-name/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Metadata collection named", body = VoidResponse),
        (status = 400, description = "No local repository configured", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_local_metadata_collection_name(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_local_metadata_collection_name(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/cohorts/{value}",
    params(ServerValuePath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Cohort registration added; the optional body overrides the derived topic and registry", body = VoidResponse),
        (status = 400, description = "No event bus configured", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn add_cohort_registration(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let overrides: Option<CohortConfig> = optional_body(&body)?;
    state
        .configuration
        .add_cohort_registration(&path.user_id, &path.server_name, &path.value, overrides)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/cohorts/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Cohort registration removed", body = VoidResponse),
        (status = 400, description = "Not registered with the cohort", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_cohort_registration(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_cohort_registration(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

// ---------------------------------------------------------------------------
// Access services
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/access-services/{value}",
    params(ServerValuePath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Access service enabled with the service options in the body", body = VoidResponse),
        (status = 400, description = "Unknown access service", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn enable_access_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let options: ServiceOptions = optional_body(&body)?;
    state
        .configuration
        .enable_access_service(&path.user_id, &path.server_name, &path.value, options)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/access-services",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Every access service enabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn enable_all_access_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let options: ServiceOptions = optional_body(&body)?;
    state
        .configuration
        .enable_all_access_services(&path.user_id, &path.server_name, options)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/access-services/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Access service disabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_access_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_access_service(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/access-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Every access service disabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_access_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_access_services(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/access-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Configured access services", body = AccessServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_access_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .configuration
        .get_access_services(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(AccessServicesResponse { services }))
}

// ---------------------------------------------------------------------------
// View services
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/view-services/{value}",
    params(ServerValuePath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "View service enabled", body = VoidResponse),
        (status = 400, description = "Unknown view service or missing metadata server", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn enable_view_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
    Json(request): Json<ViewServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .enable_view_service(&path.user_id, &path.server_name, &path.value, request)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/view-services/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "View service disabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_view_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_view_service(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/view-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Every view service disabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_view_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_view_services(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/view-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Configured view services", body = ViewServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_view_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .configuration
        .get_view_services(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(ViewServicesResponse { services }))
}

// ---------------------------------------------------------------------------
// Engine host
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/engine-definitions/client-config",
    params(ServerPath),
    request_body = RemoteServerRequest,
    responses(
        (status = 200, description = "Metadata server for engine definitions set", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_engine_definitions_client_config(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<RemoteServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .set_engine_definitions_client_config(
            &path.user_id,
            &path.server_name,
            &body.omag_server_name,
            &body.omag_server_platform_root_url,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/engine-services/{value}",
    params(ServerValuePath),
    request_body = EngineServiceRequest,
    responses(
        (status = 200, description = "Engine service configured", body = VoidResponse),
        (status = 400, description = "Unknown engine service", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn configure_engine_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
    Json(body): Json<EngineServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .configure_engine_service(
            &path.user_id,
            &path.server_name,
            &path.value,
            body.engines,
            body.options,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/engine-services/{value}",
    params(ServerValuePath),
    responses(
        (status = 200, description = "Engine service removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_engine_service(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerValuePath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_engine_service(&path.user_id, &path.server_name, &path.value)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/engine-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Engine host services removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn clear_engine_host_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .clear_engine_host_services(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/engine-services",
    params(ServerPath),
    responses(
        (status = 200, description = "Configured engine services", body = EngineServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_engine_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .configuration
        .get_engine_services(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(EngineServicesResponse { services }))
}

// ---------------------------------------------------------------------------
// Conformance suite
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/conformance-suite-workbenches/repository-workbench/repositories",
    params(ServerPath),
    request_body = RepositoryWorkbenchRequest,
    responses(
        (status = 200, description = "Repository workbench enabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn enable_repository_conformance_workbench(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<RepositoryWorkbenchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .enable_repository_conformance_workbench(
            &path.user_id,
            &path.server_name,
            &body.tut_repository_server_name,
            body.max_search_results,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/conformance-suite-workbenches/platform-workbench/platforms",
    params(ServerPath),
    request_body = PlatformWorkbenchRequest,
    responses(
        (status = 200, description = "Platform workbench enabled", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn enable_platform_conformance_workbench(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(body): Json<PlatformWorkbenchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .enable_platform_conformance_workbench(
            &path.user_id,
            &path.server_name,
            &body.tut_platform_url,
        )
        .await?;
    Ok(ok())
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/conformance-suite-workbenches",
    params(ServerPath),
    responses(
        (status = 200, description = "Conformance suite removed", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn disable_conformance_suite_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .configuration
        .disable_conformance_suite_services(&path.user_id, &path.server_name)
        .await?;
    Ok(ok())
}
