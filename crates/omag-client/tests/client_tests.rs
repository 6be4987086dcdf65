//! Drives the clients against a real platform router bound to an ephemeral port.

use std::sync::Arc;

use omag_client::{
    DatabaseManagerClient, PlatformServicesClient, RestClient, ServerConfigurationClient,
    ServerOperationsClient,
};
use omag_core::admin::{InMemoryConfigStore, ServiceOptions};
use omag_core::audit::AuditLogDestinationConfig;
use omag_core::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, KeyPattern,
};
use omag_core::operations::InMemoryConnectorFactory;
use omag_core::{OmagError, Paging, PlatformSecurity};
use omag_server::routes;
use omag_server::state::AppState;
use tokio::net::TcpListener;
use uuid::Uuid;

const API_KEY: &str = "client-test-key";
const ADMIN: &str = "garygeeke";
const SERVER: &str = "cocoMDS1";
const DAEMON_USER: &str = "erinoverview";

async fn start_platform() -> String {
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryConfigStore::new()),
        PlatformSecurity::new(vec![ADMIN.to_string()]),
        Arc::new(InMemoryConnectorFactory),
        Some(API_KEY.to_string()),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn rest(platform_url: &str) -> RestClient {
    RestClient::new(platform_url).unwrap().with_api_key(API_KEY)
}

async fn configure_and_start(platform_url: &str) -> String {
    let config = ServerConfigurationClient::new(rest(platform_url), ADMIN);
    config.set_in_memory_local_repository(SERVER).await.unwrap();
    let destination: AuditLogDestinationConfig = serde_json::from_value(serde_json::json!({
        "destination": {"type": "in_memory", "max_records": 50}
    }))
    .unwrap();
    config
        .add_audit_log_destination(SERVER, &destination)
        .await
        .unwrap();
    config
        .enable_access_service(SERVER, "data-manager", &ServiceOptions::new())
        .await
        .unwrap();

    ServerOperationsClient::new(rest(platform_url), ADMIN)
        .activate_with_stored_config(SERVER)
        .await
        .unwrap()
}

#[tokio::test]
async fn configure_start_and_inspect_server() {
    let platform_url = start_platform().await;
    let message = configure_and_start(&platform_url).await;
    assert!(message.contains("Data Manager OMAS"), "{message}");

    let config = ServerConfigurationClient::new(rest(&platform_url), ADMIN);
    assert_eq!(config.list_stored_configurations().await.unwrap(), vec![SERVER]);
    let services = config.get_access_services(SERVER).await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].access_service_url_marker, "data-manager");

    let operations = ServerOperationsClient::new(rest(&platform_url), ADMIN);
    let status = operations.get_server_status(SERVER).await.unwrap();
    assert!(status.is_active);
    assert_eq!(status.server_type.as_deref(), Some("Metadata Server"));
    assert_eq!(
        operations.get_active_services(SERVER).await.unwrap(),
        vec!["Data Manager OMAS"]
    );
    let records = operations.get_audit_log_records(SERVER).await.unwrap();
    assert!(records.iter().any(|r| r.message_id == "OMAG-ADMIN-0001"));

    let platform = PlatformServicesClient::new(rest(&platform_url), ADMIN);
    assert_eq!(platform.health().await.unwrap().active_servers, 1);
    assert_eq!(platform.list_active_servers().await.unwrap(), vec![SERVER]);
    assert!(platform.get_platform_origin().await.unwrap().starts_with("OMAG Server Platform"));
    let registered = platform.list_registered_access_services().await.unwrap();
    assert!(registered.iter().any(|s| s.service_url_marker == "data-manager"));

    operations.deactivate_temporarily(SERVER).await.unwrap();
    assert!(platform.list_active_servers().await.unwrap().is_empty());
    assert_eq!(platform.list_known_servers().await.unwrap(), vec![SERVER]);
}

#[tokio::test]
async fn integration_daemon_publishes_database() {
    let platform_url = start_platform().await;
    configure_and_start(&platform_url).await;

    let mut daemon = DatabaseManagerClient::new(rest(&platform_url), SERVER, DAEMON_USER);
    let manager_guid = daemon
        .create_database_manager(&DatabaseManagerProperties {
            qualified_name: "coco/hr postgres".into(),
            type_description: Some("PostgreSQL Server".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(daemon.external_source().unwrap().guid, manager_guid);
    assert_eq!(
        daemon
            .get_metadata_source_guid("coco/hr postgres")
            .await
            .unwrap(),
        manager_guid
    );

    let database = daemon
        .create_database(&DatabaseProperties {
            qualified_name: "coco.hr".into(),
            database_type: Some("PostgreSQL".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let schema = daemon
        .create_database_schema(
            Some(database),
            &DatabaseSchemaProperties {
                qualified_name: "coco.hr.public".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let department = daemon
        .create_database_table(
            schema,
            &DatabaseTableProperties {
                qualified_name: "coco.hr.public.department".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let employee = daemon
        .create_database_table(
            schema,
            &DatabaseTableProperties {
                qualified_name: "coco.hr.public.employee".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let column = |name: &str| DatabaseColumnProperties {
        qualified_name: name.to_string(),
        data_type: Some("integer".into()),
        ..Default::default()
    };
    let dept_id = daemon
        .create_database_column(department, &column("coco.hr.public.department.id"))
        .await
        .unwrap();
    let emp_dept = daemon
        .create_database_column(employee, &column("coco.hr.public.employee.dept_id"))
        .await
        .unwrap();

    daemon
        .set_primary_key(
            dept_id,
            &DatabasePrimaryKeyProperties {
                name: Some("department_pk".into()),
                key_pattern: KeyPattern::LocalKey,
            },
        )
        .await
        .unwrap();
    daemon
        .add_foreign_key(
            dept_id,
            emp_dept,
            &DatabaseForeignKeyProperties {
                confidence: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let element = daemon.get_database_column_by_guid(emp_dept).await.unwrap();
    assert_eq!(element.foreign_keys.len(), 1);
    assert_eq!(element.foreign_keys[0].primary_key_column_guid, dept_id);
    assert_eq!(
        element.header.external_source.unwrap().name,
        "coco/hr postgres"
    );

    let tables = daemon
        .get_tables_for_database_asset(schema, Paging::default())
        .await
        .unwrap();
    assert_eq!(tables.len(), 2);

    let found = daemon
        .find_databases("coco\\.hr", Paging::new(0, 10))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].header.guid, database);

    let managed = daemon
        .get_databases_for_database_manager(manager_guid, Paging::default())
        .await
        .unwrap();
    assert_eq!(managed.len(), 1);

    daemon.remove_database_column(emp_dept).await.unwrap();
    let columns = daemon
        .get_columns_for_database_table(employee, Paging::default())
        .await
        .unwrap();
    assert!(columns.is_empty());
}

#[tokio::test]
async fn platform_errors_come_back_as_remote_errors() {
    let platform_url = start_platform().await;
    configure_and_start(&platform_url).await;

    let daemon = DatabaseManagerClient::new(rest(&platform_url), SERVER, DAEMON_USER);
    let err = daemon.get_database_by_guid(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert_eq!(err.parameter_name(), Some("database_guid"));
    assert_eq!(err.exception_class_name(), "InvalidParameterException");

    let err = daemon
        .find_databases("coco.(hr", Paging::default())
        .await
        .unwrap_err();
    assert_eq!(err.parameter_name(), Some("search_string"));

    let stopped = DatabaseManagerClient::new(rest(&platform_url), "cocoMDS9", DAEMON_USER);
    let err = stopped
        .get_database_by_guid(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.parameter_name(), Some("server_name"));

    let not_admin = ServerConfigurationClient::new(rest(&platform_url), "erinoverview");
    let err = not_admin
        .set_organization_name(SERVER, "Coco Pharmaceuticals")
        .await
        .unwrap_err();
    assert_eq!(err.exception_class_name(), "UserNotAuthorizedException");
    assert_eq!(err.http_status(), 403);

    let anonymous = PlatformServicesClient::new(RestClient::new(&platform_url).unwrap(), ADMIN);
    let err = anonymous.list_known_servers().await.unwrap_err();
    assert!(matches!(err, OmagError::Remote { http_code: 401, .. }));

    // Health is public.
    assert_eq!(anonymous.health().await.unwrap().status, "ok");
}

#[tokio::test]
async fn put_sends_body_and_credentials() {
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::put;

    async fn echo(
        Path(name): Path<String>,
        headers: HeaderMap,
        axum::Json(body): axum::Json<serde_json::Value>,
    ) -> axum::Json<serde_json::Value> {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        axum::Json(serde_json::json!({
            "name": name,
            "authorization": authorization,
            "body": body,
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, axum::Router::new().route("/echo/{name}", put(echo)))
            .await
            .unwrap();
    });

    let client = rest(&format!("http://{addr}"));
    let url = client.url("/echo/{}", &["coco hr"], &[]).unwrap();
    let reply: serde_json::Value = client
        .put(url, &serde_json::json!({"qualified_name": "coco.hr"}))
        .await
        .unwrap();

    assert_eq!(reply["name"], "coco hr");
    assert_eq!(reply["authorization"], format!("Bearer {API_KEY}"));
    assert_eq!(reply["body"]["qualified_name"], "coco.hr");
}
