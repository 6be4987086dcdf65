use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OMAG Server Platform API",
        version = "0.1.0",
        description = "Open metadata and governance server platform: server administration, \
                       server operations and the Data Manager access service."
    ),
    paths(
        crate::routes::health,
        crate::routes::platform::get_platform_origin,
        crate::routes::platform::list_known_servers,
        crate::routes::platform::list_active_servers,
        crate::routes::platform::shutdown_all_servers,
        crate::routes::platform::list_registered_access_services,
        crate::routes::platform::list_registered_view_services,
        crate::routes::platform::list_registered_engine_services,
        crate::routes::admin::list_stored_configurations,
        crate::routes::admin::get_stored_configuration,
        crate::routes::admin::set_omag_server_config,
        crate::routes::admin::clear_omag_server_config,
        crate::routes::admin::set_server_type,
        crate::routes::admin::set_organization_name,
        crate::routes::admin::set_server_url_root,
        crate::routes::admin::set_server_user_id,
        crate::routes::admin::set_server_password,
        crate::routes::admin::set_max_page_size,
        crate::routes::admin::set_event_bus,
        crate::routes::admin::clear_event_bus,
        crate::routes::admin::set_server_security,
        crate::routes::admin::clear_server_security,
        crate::routes::admin::set_default_audit_log,
        crate::routes::admin::add_audit_log_destination,
        crate::routes::admin::clear_audit_log_destinations,
        crate::routes::admin::set_in_memory_local_repository,
        crate::routes::admin::set_postgres_local_repository,
        crate::routes::admin::set_no_repository_mode,
        crate::routes::admin::set_local_metadata_collection_name,
        crate::routes::admin::add_cohort_registration,
        crate::routes::admin::clear_cohort_registration,
        crate::routes::admin::enable_access_service,
        crate::routes::admin::enable_all_access_services,
        crate::routes::admin::disable_access_service,
        crate::routes::admin::disable_access_services,
        crate::routes::admin::get_access_services,
        crate::routes::admin::enable_view_service,
        crate::routes::admin::disable_view_service,
        crate::routes::admin::disable_view_services,
        crate::routes::admin::get_view_services,
        crate::routes::admin::set_engine_definitions_client_config,
        crate::routes::admin::configure_engine_service,
        crate::routes::admin::disable_engine_service,
        crate::routes::admin::clear_engine_host_services,
        crate::routes::admin::get_engine_services,
        crate::routes::admin::enable_repository_conformance_workbench,
        crate::routes::admin::enable_platform_conformance_workbench,
        crate::routes::admin::disable_conformance_suite_services,
        crate::routes::operations::activate_with_stored_config,
        crate::routes::operations::activate_with_supplied_config,
        crate::routes::operations::deactivate_temporarily,
        crate::routes::operations::deactivate_permanently,
        crate::routes::operations::get_active_configuration,
        crate::routes::operations::get_server_status,
        crate::routes::operations::get_active_services,
        crate::routes::operations::get_audit_log_records,
        crate::routes::data_manager::create_database_manager,
        crate::routes::data_manager::get_database_manager,
        crate::routes::data_manager::get_metadata_source_guid,
        crate::routes::data_manager::create_database,
        crate::routes::data_manager::create_database_from_template,
        crate::routes::data_manager::update_database,
        crate::routes::data_manager::publish_database,
        crate::routes::data_manager::withdraw_database,
        crate::routes::data_manager::remove_database,
        crate::routes::data_manager::find_databases,
        crate::routes::data_manager::get_databases_by_name,
        crate::routes::data_manager::get_databases_for_database_manager,
        crate::routes::data_manager::get_database_by_guid,
        crate::routes::data_manager::create_database_schema,
        crate::routes::data_manager::create_database_schema_from_template,
        crate::routes::data_manager::update_database_schema,
        crate::routes::data_manager::publish_database_schema,
        crate::routes::data_manager::withdraw_database_schema,
        crate::routes::data_manager::remove_database_schema,
        crate::routes::data_manager::find_database_schemas,
        crate::routes::data_manager::get_database_schemas_by_name,
        crate::routes::data_manager::get_schemas_for_database,
        crate::routes::data_manager::get_database_schema_by_guid,
        crate::routes::data_manager::create_database_table,
        crate::routes::data_manager::create_database_table_from_template,
        crate::routes::data_manager::update_database_table,
        crate::routes::data_manager::remove_database_table,
        crate::routes::data_manager::find_database_tables,
        crate::routes::data_manager::get_database_tables_by_name,
        crate::routes::data_manager::get_tables_for_database_asset,
        crate::routes::data_manager::get_database_table_by_guid,
        crate::routes::data_manager::create_database_view,
        crate::routes::data_manager::create_database_view_from_template,
        crate::routes::data_manager::update_database_view,
        crate::routes::data_manager::remove_database_view,
        crate::routes::data_manager::find_database_views,
        crate::routes::data_manager::get_database_views_by_name,
        crate::routes::data_manager::get_views_for_database_asset,
        crate::routes::data_manager::get_database_view_by_guid,
        crate::routes::data_manager::create_database_column,
        crate::routes::data_manager::create_database_column_from_template,
        crate::routes::data_manager::update_database_column,
        crate::routes::data_manager::remove_database_column,
        crate::routes::data_manager::find_database_columns,
        crate::routes::data_manager::get_database_columns_by_name,
        crate::routes::data_manager::get_columns_for_database_table,
        crate::routes::data_manager::get_database_column_by_guid,
        crate::routes::data_manager::set_primary_key,
        crate::routes::data_manager::remove_primary_key,
        crate::routes::data_manager::add_foreign_key,
        crate::routes::data_manager::update_foreign_key,
        crate::routes::data_manager::remove_foreign_key,
    ),
    components(schemas(
        crate::dto::DatabaseManagerRequest,
        crate::dto::MetadataSourceRequest,
        crate::dto::DatabaseRequest,
        crate::dto::DatabaseSchemaRequest,
        crate::dto::DatabaseTableRequest,
        crate::dto::DatabaseViewRequest,
        crate::dto::DatabaseColumnRequest,
        crate::dto::PrimaryKeyRequest,
        crate::dto::ForeignKeyRequest,
        crate::dto::TemplateRequest,
        crate::dto::SearchStringRequest,
        crate::dto::NameRequest,
        crate::dto::GuidResponse,
        crate::dto::VoidResponse,
        crate::dto::DatabaseManagerResponse,
        crate::dto::DatabaseResponse,
        crate::dto::DatabasesResponse,
        crate::dto::DatabaseSchemaResponse,
        crate::dto::DatabaseSchemasResponse,
        crate::dto::DatabaseTableResponse,
        crate::dto::DatabaseTablesResponse,
        crate::dto::DatabaseViewResponse,
        crate::dto::DatabaseViewsResponse,
        crate::dto::DatabaseColumnResponse,
        crate::dto::DatabaseColumnsResponse,
        crate::dto::ServerConfigResponse,
        crate::dto::PostgresRepositoryRequest,
        crate::dto::RemoteServerRequest,
        crate::dto::EngineServiceRequest,
        crate::dto::RepositoryWorkbenchRequest,
        crate::dto::PlatformWorkbenchRequest,
        crate::dto::AccessServicesResponse,
        crate::dto::ViewServicesResponse,
        crate::dto::EngineServicesResponse,
        crate::dto::SuccessMessageResponse,
        crate::dto::ServerStatusResponse,
        crate::dto::ServerListResponse,
        crate::dto::ServiceListResponse,
        crate::dto::AuditLogResponse,
        crate::dto::RegisteredServicesResponse,
        crate::dto::PlatformOriginResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "platform", description = "Platform origin, known servers and registered services"),
        (name = "admin", description = "Server configuration documents"),
        (name = "operations", description = "Starting, stopping and inspecting servers"),
        (name = "data-manager", description = "Databases published by integration daemons"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("token")
                        .description(Some(
                            "Platform API key. Set via OMAG_PLATFORM_API_KEY environment variable.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_service() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key(
            "/open-metadata/admin-services/users/{user_id}/servers/{server_name}/instance"
        ));
        assert!(paths.contains_key(
            "/servers/{server_name}/open-metadata/access-services/data-manager/users/{user_id}/databases"
        ));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer"))
        );
    }
}
