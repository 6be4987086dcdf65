use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{ADMIN_BASE, SERVER, TEST_API_KEY, setup_open_app, setup_test_app};

const PLATFORM_BASE: &str = "/open-metadata/platform-services/users/garygeeke/server-platform";

#[tokio::test]
async fn health_returns_200_without_credentials() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_servers"], 0);
}

#[tokio::test]
async fn unauthenticated_request_returns_401() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::get(format!("{PLATFORM_BASE}/origin"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exception_class_name"], "UserNotAuthorizedException");
    assert_eq!(json["related_http_code"], 401);
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::get(format!("{PLATFORM_BASE}/origin"))
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn open_platform_needs_no_token() {
    let app = setup_open_app();

    let (status, json) = app
        .send("GET", &format!("{PLATFORM_BASE}/origin"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        json["origin"]
            .as_str()
            .unwrap()
            .starts_with("OMAG Server Platform")
    );
}

#[tokio::test]
async fn registered_access_services_include_data_manager() {
    let app = setup_test_app();

    let (status, json) = app
        .send(
            "GET",
            &format!("{PLATFORM_BASE}/registered-services/access-services"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let services = json["services"].as_array().unwrap();
    assert!(
        services
            .iter()
            .any(|s| s["service_url_marker"] == "data-manager"
                && s["service_full_name"] == "Data Manager OMAS")
    );
}

#[tokio::test]
async fn non_admin_user_is_rejected() {
    let app = setup_test_app();

    let (status, json) = app
        .send(
            "GET",
            "/open-metadata/admin-services/users/erinoverview/servers/cocoMDS1/configuration",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["exception_class_name"], "UserNotAuthorizedException");
}

#[tokio::test]
async fn configuration_document_accumulates_changes() {
    let app = setup_test_app();

    let (status, _) = app
        .send(
            "POST",
            &format!("{ADMIN_BASE}/organization-name/Coco%20Pharmaceuticals"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", &format!("{ADMIN_BASE}/max-page-size/50"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send("GET", &format!("{ADMIN_BASE}/configuration"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let config = &json["omag_server_config"];
    assert_eq!(config["local_server_name"], SERVER);
    assert_eq!(config["organization_name"], "Coco Pharmaceuticals");
    assert_eq!(config["max_page_size"], 50);
    assert_eq!(config["audit_trail"].as_array().unwrap().len(), 2);

    let (status, json) = app
        .send(
            "GET",
            "/open-metadata/admin-services/users/garygeeke/stored-configurations",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["server_list"], json!([SERVER]));
}

#[tokio::test]
async fn invalid_max_page_size_returns_ffdc() {
    let app = setup_test_app();

    let (status, json) = app
        .send("POST", &format!("{ADMIN_BASE}/max-page-size/lots"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["exception_class_name"], "InvalidParameterException");
    assert_eq!(json["parameter_name"], "max_page_size");
}

#[tokio::test]
async fn cohort_without_event_bus_is_a_configuration_error() {
    let app = setup_test_app();

    let (status, json) = app
        .send("POST", &format!("{ADMIN_BASE}/cohorts/cocoCohort"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["exception_class_name"], "OMAGConfigurationErrorException");

    let (status, _) = app
        .send("POST", &format!("{ADMIN_BASE}/event-bus"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", &format!("{ADMIN_BASE}/cohorts/cocoCohort"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{ADMIN_BASE}/configuration"), None)
        .await;
    let cohorts = &json["omag_server_config"]["repository_services_config"]["cohort_configs"];
    assert_eq!(cohorts[0]["cohort_name"], "cocoCohort");
}

#[tokio::test]
async fn unknown_access_service_is_rejected() {
    let app = setup_test_app();

    let (status, json) = app
        .send(
            "POST",
            &format!("{ADMIN_BASE}/access-services/no-such-service"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter_name"], "service_url_marker");
}

#[tokio::test]
async fn starting_without_configuration_fails() {
    let app = setup_test_app();

    let (status, json) = app
        .send("POST", &format!("{ADMIN_BASE}/instance"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["exception_class_name"], "OMAGConfigurationErrorException");
}

#[tokio::test]
async fn server_lifecycle() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;

    let (status, json) = app
        .send("GET", &format!("{ADMIN_BASE}/instance/status"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_active"], true);
    assert_eq!(json["server_type"], "Metadata Server");

    let (_, json) = app
        .send("GET", &format!("{ADMIN_BASE}/instance/services"), None)
        .await;
    assert_eq!(json["services"], json!(["Data Manager OMAS"]));

    let (_, json) = app
        .send("GET", &format!("{PLATFORM_BASE}/servers/active"), None)
        .await;
    assert_eq!(json["server_list"], json!([SERVER]));

    let (_, json) = app
        .send("GET", &format!("{ADMIN_BASE}/instance/audit-log"), None)
        .await;
    let ids: Vec<&str> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["message_id"].as_str())
        .collect();
    assert!(ids.contains(&"OMAG-ADMIN-0001"));
    assert!(ids.contains(&"OMRS-AUDIT-0001"));

    let (status, _) = app
        .send("DELETE", &format!("{ADMIN_BASE}/instance"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{ADMIN_BASE}/instance/status"), None)
        .await;
    assert_eq!(json["is_active"], false);
    assert!(json["server_end_time"].is_string());

    let (status, json) = app
        .send("GET", &format!("{ADMIN_BASE}/instance/services"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "server_not_active");

    let (_, json) = app
        .send("GET", &format!("{PLATFORM_BASE}/servers"), None)
        .await;
    assert_eq!(json["server_list"], json!([SERVER]));
}

#[tokio::test]
async fn deleting_a_server_removes_its_configuration() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;

    let (status, _) = app.send("DELETE", ADMIN_BASE, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send(
            "GET",
            "/open-metadata/admin-services/users/garygeeke/stored-configurations",
            None,
        )
        .await;
    assert_eq!(json["server_list"], json!([]));
    assert_eq!(app.state.operations.active_server_count().await, 0);
}

#[tokio::test]
async fn shutdown_all_stops_every_server() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    assert_eq!(app.state.operations.active_server_count().await, 1);

    let (status, _) = app
        .send("DELETE", &format!("{PLATFORM_BASE}/servers/active"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.state.operations.active_server_count().await, 0);
}

#[tokio::test]
async fn configuration_without_json_content_type_is_rejected() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::post(format!("{ADMIN_BASE}/configuration"))
                .header("authorization", format!("Bearer {TEST_API_KEY}"))
                .body(Body::from("local_server_name=cocoMDS1"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exception_class_name"], "InvalidParameterException");
    assert_eq!(json["parameter_name"], "request_body");
}
