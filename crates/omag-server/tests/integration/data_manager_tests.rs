use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{DM_BASE, TestApp, setup_test_app};

const MANAGER_NAME: &str = "coco-hr-postgres";

/// Register the database manager and return the external source fields to send with
/// every request.
async fn register_manager(app: &TestApp) -> Value {
    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/database-managers"),
            Some(json!({
                "properties": {
                    "qualified_name": MANAGER_NAME,
                    "type_description": "PostgreSQL Server"
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json!({
        "external_source_guid": json["guid"],
        "external_source_name": MANAGER_NAME,
    })
}

fn with_source(source: &Value, properties: Value) -> Value {
    let mut body = source.clone();
    body["properties"] = properties;
    body
}

async fn create(app: &TestApp, path: &str, body: Value) -> String {
    let (status, json) = app
        .send("POST", &format!("{DM_BASE}{path}"), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK, "{path}: {json}");
    json["guid"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn data_manager_requires_an_active_server() {
    let app = setup_test_app();

    let (status, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{}", uuid::Uuid::nil()), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["exception_class_name"], "InvalidParameterException");
    assert_eq!(json["parameter_name"], "server_name");
}

#[tokio::test]
async fn publish_database_structure() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let database = create(
        &app,
        "/databases",
        with_source(
            &source,
            json!({
                "qualified_name": "coco-hr-postgres.hr",
                "display_name": "HR",
                "database_type": "PostgreSQL"
            }),
        ),
    )
    .await;

    let schema = create(
        &app,
        &format!("/schemas?database_guid={database}"),
        with_source(&source, json!({"qualified_name": "coco-hr-postgres.hr.public"})),
    )
    .await;

    let table = create(
        &app,
        &format!("/database-assets/{schema}/tables"),
        with_source(
            &source,
            json!({
                "qualified_name": "coco-hr-postgres.hr.public.employee",
                "display_name": "employee"
            }),
        ),
    )
    .await;

    let id_column = create(
        &app,
        &format!("/tables/{table}/columns"),
        with_source(
            &source,
            json!({
                "qualified_name": "coco-hr-postgres.hr.public.employee.id",
                "data_type": "integer",
                "position": 0
            }),
        ),
    )
    .await;

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/columns/{id_column}/primary-key"),
            Some(with_source(&source, json!({"name": "employee_pk", "key_pattern": "local_key"}))),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");

    let (status, json) = app
        .send("GET", &format!("{DM_BASE}/columns/{id_column}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["element"]["properties"]["data_type"], "integer");
    assert_eq!(json["element"]["primary_key"]["name"], "employee_pk");
    assert_eq!(
        json["element"]["header"]["external_source"]["name"],
        MANAGER_NAME
    );

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}/schemas"), None)
        .await;
    assert_eq!(json["elements"].as_array().unwrap().len(), 1);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/database-assets/{schema}/tables"), None)
        .await;
    assert_eq!(
        json["elements"][0]["properties"]["qualified_name"],
        "coco-hr-postgres.hr.public.employee"
    );

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/tables/{table}/columns"), None)
        .await;
    assert_eq!(json["elements"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_and_lookup_by_name() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    for name in ["hr", "payroll", "sales"] {
        create(
            &app,
            "/databases",
            with_source(
                &source,
                json!({"qualified_name": format!("coco.{name}"), "display_name": name}),
            ),
        )
        .await;
    }

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/by-search-string"),
            Some(json!({"search_string": "coco\\.(hr|payroll)"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["elements"].as_array().unwrap().len(), 2);

    let (_, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/by-search-string?start_from=1&page_size=1"),
            Some(json!({"search_string": "coco.*"})),
        )
        .await;
    assert_eq!(json["elements"].as_array().unwrap().len(), 1);

    let (_, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/by-name"),
            Some(json!({"name": "sales"})),
        )
        .await;
    assert_eq!(json["elements"][0]["properties"]["qualified_name"], "coco.sales");

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/by-search-string"),
            Some(json!({"search_string": "coco.(hr"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter_name"], "search_string");
}

#[tokio::test]
async fn update_merges_or_replaces_properties() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let database = create(
        &app,
        "/databases",
        with_source(
            &source,
            json!({
                "qualified_name": "coco.hr",
                "description": "Human resources",
                "database_type": "PostgreSQL"
            }),
        ),
    )
    .await;

    let (status, _) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/{database}?is_merge_update=true"),
            Some(with_source(
                &source,
                json!({"qualified_name": "coco.hr", "database_version": "16"}),
            )),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert_eq!(json["element"]["properties"]["description"], "Human resources");
    assert_eq!(json["element"]["properties"]["database_version"], "16");

    let (status, _) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/{database}"),
            Some(with_source(&source, json!({"qualified_name": "coco.hr"}))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert!(json["element"]["properties"]["description"].is_null());
}

#[tokio::test]
async fn removing_a_database_removes_its_tables() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let database = create(
        &app,
        "/databases",
        with_source(&source, json!({"qualified_name": "coco.hr"})),
    )
    .await;
    let table = create(
        &app,
        &format!("/database-assets/{database}/tables"),
        with_source(&source, json!({"qualified_name": "coco.hr.employee"})),
    )
    .await;

    let (status, _) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/{database}/delete"),
            Some(source.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["parameter_name"], "database_guid");

    let (status, _) = app
        .send("GET", &format!("{DM_BASE}/tables/{table}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_validation_errors() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let (status, json) = app
        .send("POST", &format!("{DM_BASE}/databases"), Some(source.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter_name"], "properties");

    let (status, json) = app
        .send("GET", &format!("{DM_BASE}/databases/not-a-guid"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter_name"], "database_guid");

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases"),
            Some(json!({
                "external_source_guid": source["external_source_guid"],
                "external_source_name": "someone-else",
                "properties": {"qualified_name": "coco.hr"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["parameter_name"], "external_source_name");
}

#[tokio::test]
async fn undecodable_requests_get_ffdc_errors() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases"),
            Some(with_source(&source, json!({"qualified_name": 42}))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["exception_class_name"], "InvalidParameterException");
    assert_eq!(json["parameter_name"], "request_body");
    assert_eq!(json["related_http_code"], 400);

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/databases/by-search-string?start_from=0&page_size=-1"),
            Some(json!({"search_string": ".*"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["exception_class_name"], "InvalidParameterException");
    assert_eq!(json["parameter_name"], "query_string");
}

#[tokio::test]
async fn publish_moves_database_between_zones() {
    let app = setup_test_app();
    app.start_metadata_server(json!({
        "DefaultZones": ["quarantine"],
        "PublishZones": ["data-lake"]
    }))
    .await;
    let source = register_manager(&app).await;

    let database = create(
        &app,
        "/databases",
        with_source(&source, json!({"qualified_name": "coco.hr"})),
    )
    .await;

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert_eq!(json["element"]["properties"]["zone_membership"], json!(["quarantine"]));

    let (status, _) = app
        .send("POST", &format!("{DM_BASE}/databases/{database}/publish"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert_eq!(json["element"]["properties"]["zone_membership"], json!(["data-lake"]));

    let (status, _) = app
        .send("POST", &format!("{DM_BASE}/databases/{database}/withdraw"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/databases/{database}"), None)
        .await;
    assert_eq!(json["element"]["properties"]["zone_membership"], json!(["quarantine"]));
}

#[tokio::test]
async fn foreign_keys_link_columns() {
    let app = setup_test_app();
    app.start_metadata_server(json!({})).await;
    let source = register_manager(&app).await;

    let database = create(
        &app,
        "/databases",
        with_source(&source, json!({"qualified_name": "coco.hr"})),
    )
    .await;
    let employee = create(
        &app,
        &format!("/database-assets/{database}/tables"),
        with_source(&source, json!({"qualified_name": "coco.hr.employee"})),
    )
    .await;
    let department = create(
        &app,
        &format!("/database-assets/{database}/tables"),
        with_source(&source, json!({"qualified_name": "coco.hr.department"})),
    )
    .await;
    let dept_id = create(
        &app,
        &format!("/tables/{department}/columns"),
        with_source(&source, json!({"qualified_name": "coco.hr.department.id"})),
    )
    .await;
    let employee_dept = create(
        &app,
        &format!("/tables/{employee}/columns"),
        with_source(&source, json!({"qualified_name": "coco.hr.employee.dept_id"})),
    )
    .await;

    let (status, _) = app
        .send(
            "POST",
            &format!("{DM_BASE}/columns/{dept_id}/primary-key"),
            Some(with_source(&source, json!({"key_pattern": "local_key"}))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send(
            "POST",
            &format!("{DM_BASE}/columns/{dept_id}/foreign-keys/{employee_dept}"),
            Some(with_source(&source, json!({"name": "employee_department_fk"}))),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/columns/{employee_dept}"), None)
        .await;
    let foreign_keys = json["element"]["foreign_keys"].as_array().unwrap();
    assert_eq!(foreign_keys.len(), 1);
    assert_eq!(foreign_keys[0]["primary_key_column_guid"], dept_id.as_str());

    let (status, _) = app
        .send(
            "POST",
            &format!("{DM_BASE}/columns/{dept_id}/foreign-keys/{employee_dept}/delete"),
            Some(source.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send("GET", &format!("{DM_BASE}/columns/{employee_dept}"), None)
        .await;
    assert!(json["element"].get("foreign_keys").is_none());
}
