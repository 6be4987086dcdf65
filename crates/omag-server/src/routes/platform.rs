//! Platform services: what the platform is, which servers it knows and which services
//! it can run.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;

use omag_core::admin::registration;
use omag_core::validation::validate_user_id;

use crate::dto::{
    PlatformOriginResponse, PlatformPath, RegisteredServicesResponse, ServerListResponse,
    VoidResponse,
};
use crate::error::ApiError;
use crate::state::{AppState, PLATFORM_ORIGIN};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/origin", get(get_platform_origin))
        .route("/servers", get(list_known_servers))
        .route(
            "/servers/active",
            get(list_active_servers).delete(shutdown_all_servers),
        )
        .route(
            "/registered-services/access-services",
            get(list_registered_access_services),
        )
        .route(
            "/registered-services/view-services",
            get(list_registered_view_services),
        )
        .route(
            "/registered-services/engine-services",
            get(list_registered_engine_services),
        )
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/origin",
    params(PlatformPath),
    responses(
        (status = 200, description = "Platform description", body = PlatformOriginResponse),
        (status = 400, description = "Invalid user id", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn get_platform_origin(
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_id(&path.user_id)?;
    Ok(axum::Json(PlatformOriginResponse {
        origin: PLATFORM_ORIGIN.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/servers",
    params(PlatformPath),
    responses(
        (status = 200, description = "Servers with a stored configuration or that have run", body = ServerListResponse),
        (status = 403, description = "Not a platform administrator", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn list_known_servers(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    let server_list = state.operations.list_known_servers(&path.user_id).await?;
    Ok(axum::Json(ServerListResponse { server_list }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/servers/active",
    params(PlatformPath),
    responses(
        (status = 200, description = "Running servers", body = ServerListResponse),
        (status = 403, description = "Not a platform administrator", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn list_active_servers(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    let server_list = state.operations.list_active_servers(&path.user_id).await?;
    Ok(axum::Json(ServerListResponse { server_list }))
}

#[utoipa::path(
    delete,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/servers/active",
    params(PlatformPath),
    responses(
        (status = 200, description = "Every server stopped", body = VoidResponse),
        (status = 403, description = "Not a platform administrator", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn shutdown_all_servers(
    State(state): State<Arc<AppState>>,
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    state.security.check_admin(&path.user_id)?;
    state.operations.shutdown_all().await;
    tracing::info!(user = %path.user_id, "All servers shut down");
    Ok(axum::Json(VoidResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/registered-services/access-services",
    params(PlatformPath),
    responses(
        (status = 200, description = "Access services the platform supports", body = RegisteredServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn list_registered_access_services(
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_id(&path.user_id)?;
    Ok(axum::Json(RegisteredServicesResponse {
        services: registration::access_services(),
    }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/registered-services/view-services",
    params(PlatformPath),
    responses(
        (status = 200, description = "View services the platform supports", body = RegisteredServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn list_registered_view_services(
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_id(&path.user_id)?;
    Ok(axum::Json(RegisteredServicesResponse {
        services: registration::view_services(),
    }))
}

#[utoipa::path(
    get,
    path = "/open-metadata/platform-services/users/{user_id}/server-platform/registered-services/engine-services",
    params(PlatformPath),
    responses(
        (status = 200, description = "Engine services the platform supports", body = RegisteredServicesResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "platform"
)]
pub async fn list_registered_engine_services(
    Path(path): Path<PlatformPath>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_id(&path.user_id)?;
    Ok(axum::Json(RegisteredServicesResponse {
        services: registration::engine_services(),
    }))
}
