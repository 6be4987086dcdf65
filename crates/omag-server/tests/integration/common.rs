use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use omag_core::PlatformSecurity;
use omag_core::admin::InMemoryConfigStore;
use omag_core::operations::InMemoryConnectorFactory;
use omag_server::routes;
use omag_server::state::AppState;

pub const TEST_API_KEY: &str = "test-secret-key";
pub const ADMIN: &str = "garygeeke";
pub const SERVER: &str = "cocoMDS1";
pub const ADMIN_BASE: &str = "/open-metadata/admin-services/users/garygeeke/servers/cocoMDS1";
pub const DM_BASE: &str =
    "/servers/cocoMDS1/open-metadata/access-services/data-manager/users/erinoverview";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    api_key: Option<String>,
}

/// Router over in-memory stores, protected by `TEST_API_KEY`.
pub fn setup_test_app() -> TestApp {
    build(Some(TEST_API_KEY.to_string()))
}

/// Router with no API key configured.
pub fn setup_open_app() -> TestApp {
    build(None)
}

fn build(api_key: Option<String>) -> TestApp {
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryConfigStore::new()),
        PlatformSecurity::new(vec![ADMIN.to_string()]),
        Arc::new(InMemoryConnectorFactory),
        api_key.clone(),
    ));
    TestApp {
        router: routes::router(state.clone()),
        state,
        api_key,
    }
}

impl TestApp {
    /// Send a request and decode the JSON response body (`Null` when empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(key) = &self.api_key {
            request = request.header("authorization", format!("Bearer {key}"));
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    /// Configure `cocoMDS1` as an in-memory metadata server running the data manager,
    /// and start it.
    pub async fn start_metadata_server(&self, access_options: serde_json::Value) {
        let (status, _) = self
            .send(
                "POST",
                &format!("{ADMIN_BASE}/local-repository/mode/in-memory-repository"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = self
            .send(
                "POST",
                &format!("{ADMIN_BASE}/audit-log-destinations"),
                Some(serde_json::json!({
                    "destination": {"type": "in_memory", "max_records": 100}
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = self
            .send(
                "POST",
                &format!("{ADMIN_BASE}/access-services/data-manager"),
                Some(access_options),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = self
            .send("POST", &format!("{ADMIN_BASE}/instance"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }
}
