//! Operational services: start, stop and inspect the servers running on the platform.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};

use omag_core::OmagServerConfig;

use crate::dto::{
    AuditLogResponse, ServerConfigResponse, ServerPath, ServerStatusResponse,
    ServiceListResponse, SuccessMessageResponse, VoidResponse,
};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/servers/{server_name}", delete(deactivate_permanently))
        .route(
            "/servers/{server_name}/instance",
            post(activate_with_stored_config).delete(deactivate_temporarily),
        )
        .route(
            "/servers/{server_name}/instance/configuration",
            get(get_active_configuration).post(activate_with_supplied_config),
        )
        .route("/servers/{server_name}/instance/status", get(get_server_status))
        .route(
            "/servers/{server_name}/instance/services",
            get(get_active_services),
        )
        .route(
            "/servers/{server_name}/instance/audit-log",
            get(get_audit_log_records),
        )
}

#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance",
    params(ServerPath),
    responses(
        (status = 200, description = "Server started from its stored configuration", body = SuccessMessageResponse),
        (status = 400, description = "Missing or invalid configuration", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn activate_with_stored_config(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let success_message = state
        .operations
        .activate_with_stored_config(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(SuccessMessageResponse { success_message }))
}

/// Start (or restart) a server from the configuration document in the body.
#[utoipa::path(
    post,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance/configuration",
    params(ServerPath),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Server started", body = SuccessMessageResponse),
        (status = 400, description = "Invalid configuration", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn activate_with_supplied_config(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
    Json(config): Json<OmagServerConfig>,
) -> Result<impl IntoResponse, ApiError> {
    let success_message = state
        .operations
        .activate_with_supplied_config(&path.user_id, &path.server_name, config)
        .await?;
    Ok(axum::Json(SuccessMessageResponse { success_message }))
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance",
    params(ServerPath),
    responses(
        (status = 200, description = "Server stopped; its configuration is kept", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn deactivate_temporarily(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .operations
        .deactivate_temporarily(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(VoidResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}",
    params(ServerPath),
    responses(
        (status = 200, description = "Server stopped and its configuration deleted", body = VoidResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn deactivate_permanently(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .operations
        .deactivate_permanently(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(VoidResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance/configuration",
    params(ServerPath),
    responses(
        (status = 200, description = "Configuration the server is running with", body = ServerConfigResponse),
        (status = 404, description = "Server not active", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn get_active_configuration(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let omag_server_config = state
        .operations
        .get_active_configuration(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(ServerConfigResponse { omag_server_config }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance/status",
    params(ServerPath),
    responses(
        (status = 200, description = "Server status", body = ServerStatusResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn get_server_status(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state
        .operations
        .get_server_status(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(ServerStatusResponse::from(status)))
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance/services",
    params(ServerPath),
    responses(
        (status = 200, description = "Services running in the server", body = ServiceListResponse),
        (status = 404, description = "Server not active", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn get_active_services(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .operations
        .get_active_services(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(ServiceListResponse { services }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance/audit-log",
    params(ServerPath),
    responses(
        (status = 200, description = "Records held by the in-memory audit log destinations", body = AuditLogResponse),
        (status = 404, description = "Server not active", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "operations"
)]
pub async fn get_audit_log_records(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ServerPath>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .operations
        .get_audit_log_records(&path.user_id, &path.server_name)
        .await?;
    Ok(axum::Json(AuditLogResponse { records }))
}
