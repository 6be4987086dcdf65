use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use omag_core::OmagError;
use serde::de::DeserializeOwned;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_api_key;
use crate::dto::HealthResponse;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod admin;
pub mod data_manager;
pub mod operations;
pub mod platform;

pub const PLATFORM_BASE: &str = "/open-metadata/platform-services/users/{user_id}/server-platform";
pub const ADMIN_BASE: &str = "/open-metadata/admin-services/users/{user_id}";
pub const DATA_MANAGER_BASE: &str =
    "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}";

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest(PLATFORM_BASE, platform::routes())
        .nest(ADMIN_BASE, admin::routes().merge(operations::routes()))
        .nest(DATA_MANAGER_BASE, data_manager::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

/// Decode a JSON body that may be left out; an empty body gives the default value.
pub(crate) fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, OmagError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Platform is up", body = HealthResponse),
    ),
    tag = "platform"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_servers: state.operations.active_server_count().await,
    })
}
