//! Client for the administration services that build a server's configuration document.

use omag_core::OmagError;
use omag_core::admin::config::EngineServiceConfig;
use omag_core::admin::{
    AccessServiceConfig, CohortConfig, EventBusConfig, OmagServerConfig, ServerSecurityConfig,
    ServiceOptions, ViewServiceConfig, ViewServiceRequest,
};
use omag_core::audit::AuditLogDestinationConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::rest::{RestClient, ServerListResponse, Void};

const ADMIN_BASE: &str = "/open-metadata/admin-services/users/{}";

#[derive(Deserialize)]
struct ServerConfigResponse {
    omag_server_config: OmagServerConfig,
}

#[derive(Deserialize)]
struct ServicesResponse<T> {
    services: Vec<T>,
}

#[derive(Serialize)]
struct EngineServiceRequest<'a> {
    engines: &'a [String],
    options: &'a ServiceOptions,
}

/// Builds configuration documents on a remote platform. Every call is made as
/// `user_id`, who must be one of the platform's administrators.
#[derive(Clone)]
pub struct ServerConfigurationClient {
    rest: RestClient,
    user_id: String,
}

impl ServerConfigurationClient {
    pub fn new(rest: RestClient, user_id: impl Into<String>) -> Self {
        Self {
            rest,
            user_id: user_id.into(),
        }
    }

    fn server_url(
        &self,
        server_name: &str,
        suffix: &str,
        params: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url, OmagError> {
        let template = format!("{ADMIN_BASE}/servers/{{}}{suffix}");
        let mut all = vec![self.user_id.as_str(), server_name];
        all.extend_from_slice(params);
        self.rest.url(&template, &all, query)
    }

    async fn post_empty(
        &self,
        server_name: &str,
        suffix: &str,
        params: &[&str],
    ) -> Result<(), OmagError> {
        let url = self.server_url(server_name, suffix, params, &[])?;
        self.rest.post::<(), Void>(url, None).await?;
        Ok(())
    }

    async fn post_body<B: Serialize + ?Sized>(
        &self,
        server_name: &str,
        suffix: &str,
        params: &[&str],
        body: &B,
    ) -> Result<(), OmagError> {
        let url = self.server_url(server_name, suffix, params, &[])?;
        self.rest.post::<B, Void>(url, Some(body)).await?;
        Ok(())
    }

    async fn delete(
        &self,
        server_name: &str,
        suffix: &str,
        params: &[&str],
    ) -> Result<(), OmagError> {
        let url = self.server_url(server_name, suffix, params, &[])?;
        self.rest.delete::<Void>(url).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Configuration documents
    // -----------------------------------------------------------------------

    pub async fn list_stored_configurations(&self) -> Result<Vec<String>, OmagError> {
        let url = self.rest.url(
            &format!("{ADMIN_BASE}/stored-configurations"),
            &[self.user_id.as_str()],
            &[],
        )?;
        let response: ServerListResponse = self.rest.get(url).await?;
        Ok(response.server_list)
    }

    pub async fn get_stored_configuration(
        &self,
        server_name: &str,
    ) -> Result<OmagServerConfig, OmagError> {
        let url = self.server_url(server_name, "/configuration", &[], &[])?;
        let response: ServerConfigResponse = self.rest.get(url).await?;
        Ok(response.omag_server_config)
    }

    pub async fn set_omag_server_config(
        &self,
        server_name: &str,
        config: &OmagServerConfig,
    ) -> Result<(), OmagError> {
        self.post_body(server_name, "/configuration", &[], config).await
    }

    pub async fn clear_omag_server_config(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/configuration", &[]).await
    }

    // -----------------------------------------------------------------------
    // Basic properties
    // -----------------------------------------------------------------------

    /// `None` clears the server type so the platform derives it from the services.
    pub async fn set_server_type(
        &self,
        server_name: &str,
        type_name: Option<&str>,
    ) -> Result<(), OmagError> {
        let query: Vec<(&str, String)> = type_name
            .map(|t| vec![("type_name", t.to_string())])
            .unwrap_or_default();
        let url = self.server_url(server_name, "/server-type", &[], &query)?;
        self.rest.post::<(), Void>(url, None).await?;
        Ok(())
    }

    pub async fn set_organization_name(
        &self,
        server_name: &str,
        name: &str,
    ) -> Result<(), OmagError> {
        self.post_empty(server_name, "/organization-name/{}", &[name]).await
    }

    pub async fn set_server_url_root(
        &self,
        server_name: &str,
        url_root: &str,
    ) -> Result<(), OmagError> {
        let url = self.server_url(
            server_name,
            "/server-url-root",
            &[],
            &[("url", url_root.to_string())],
        )?;
        self.rest.post::<(), Void>(url, None).await?;
        Ok(())
    }

    pub async fn set_server_user_id(
        &self,
        server_name: &str,
        server_user_id: &str,
    ) -> Result<(), OmagError> {
        self.post_empty(server_name, "/server-user-id/{}", &[server_user_id]).await
    }

    pub async fn set_server_password(
        &self,
        server_name: &str,
        password: &str,
    ) -> Result<(), OmagError> {
        self.post_empty(server_name, "/server-user-password/{}", &[password]).await
    }

    pub async fn set_max_page_size(
        &self,
        server_name: &str,
        max_page_size: usize,
    ) -> Result<(), OmagError> {
        let value = max_page_size.to_string();
        self.post_empty(server_name, "/max-page-size/{}", &[value.as_str()]).await
    }

    // -----------------------------------------------------------------------
    // Event bus and security
    // -----------------------------------------------------------------------

    /// `None` sets the platform's default event bus.
    pub async fn set_event_bus(
        &self,
        server_name: &str,
        event_bus: Option<&EventBusConfig>,
    ) -> Result<(), OmagError> {
        match event_bus {
            Some(config) => self.post_body(server_name, "/event-bus", &[], config).await,
            None => self.post_empty(server_name, "/event-bus", &[]).await,
        }
    }

    pub async fn clear_event_bus(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/event-bus", &[]).await
    }

    pub async fn set_server_security(
        &self,
        server_name: &str,
        security: &ServerSecurityConfig,
    ) -> Result<(), OmagError> {
        self.post_body(server_name, "/security", &[], security).await
    }

    pub async fn clear_server_security(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/security", &[]).await
    }

    // -----------------------------------------------------------------------
    // Audit log
    // -----------------------------------------------------------------------

    pub async fn set_default_audit_log(&self, server_name: &str) -> Result<(), OmagError> {
        self.post_empty(server_name, "/audit-log-destinations/default", &[]).await
    }

    pub async fn add_audit_log_destination(
        &self,
        server_name: &str,
        destination: &AuditLogDestinationConfig,
    ) -> Result<(), OmagError> {
        self.post_body(server_name, "/audit-log-destinations", &[], destination)
            .await
    }

    pub async fn clear_audit_log_destinations(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/audit-log-destinations", &[]).await
    }

    // -----------------------------------------------------------------------
    // Local repository and cohorts
    // -----------------------------------------------------------------------

    pub async fn set_in_memory_local_repository(&self, server_name: &str) -> Result<(), OmagError> {
        self.post_empty(server_name, "/local-repository/mode/in-memory-repository", &[])
            .await
    }

    pub async fn set_postgres_local_repository(
        &self,
        server_name: &str,
        connection_url: &str,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/local-repository/mode/postgres-repository",
            &[],
            &serde_json::json!({ "connection_url": connection_url }),
        )
        .await
    }

    pub async fn set_no_repository_mode(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/local-repository", &[]).await
    }

    pub async fn set_local_metadata_collection_name(
        &self,
        server_name: &str,
        name: &str,
    ) -> Result<(), OmagError> {
        self.post_empty(
            server_name,
            "/local-repository/metadata-collection-name/{}",
            &[name],
        )
        .await
    }

    /// `None` registers with the cohort using the default topic and registry store.
    pub async fn add_cohort_registration(
        &self,
        server_name: &str,
        cohort_name: &str,
        cohort: Option<&CohortConfig>,
    ) -> Result<(), OmagError> {
        match cohort {
            Some(config) => {
                self.post_body(server_name, "/cohorts/{}", &[cohort_name], config)
                    .await
            }
            None => self.post_empty(server_name, "/cohorts/{}", &[cohort_name]).await,
        }
    }

    pub async fn clear_cohort_registration(
        &self,
        server_name: &str,
        cohort_name: &str,
    ) -> Result<(), OmagError> {
        self.delete(server_name, "/cohorts/{}", &[cohort_name]).await
    }

    // -----------------------------------------------------------------------
    // Access services
    // -----------------------------------------------------------------------

    pub async fn enable_access_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
        options: &ServiceOptions,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/access-services/{}",
            &[service_url_marker],
            options,
        )
        .await
    }

    pub async fn enable_all_access_services(
        &self,
        server_name: &str,
        options: &ServiceOptions,
    ) -> Result<(), OmagError> {
        self.post_body(server_name, "/access-services", &[], options).await
    }

    pub async fn disable_access_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
    ) -> Result<(), OmagError> {
        self.delete(server_name, "/access-services/{}", &[service_url_marker])
            .await
    }

    pub async fn disable_access_services(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/access-services", &[]).await
    }

    pub async fn get_access_services(
        &self,
        server_name: &str,
    ) -> Result<Vec<AccessServiceConfig>, OmagError> {
        let url = self.server_url(server_name, "/access-services", &[], &[])?;
        let response: ServicesResponse<AccessServiceConfig> = self.rest.get(url).await?;
        Ok(response.services)
    }

    // -----------------------------------------------------------------------
    // View services
    // -----------------------------------------------------------------------

    pub async fn enable_view_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
        request: &ViewServiceRequest,
    ) -> Result<(), OmagError> {
        self.post_body(server_name, "/view-services/{}", &[service_url_marker], request)
            .await
    }

    pub async fn disable_view_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
    ) -> Result<(), OmagError> {
        self.delete(server_name, "/view-services/{}", &[service_url_marker])
            .await
    }

    pub async fn disable_view_services(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/view-services", &[]).await
    }

    pub async fn get_view_services(
        &self,
        server_name: &str,
    ) -> Result<Vec<ViewServiceConfig>, OmagError> {
        let url = self.server_url(server_name, "/view-services", &[], &[])?;
        let response: ServicesResponse<ViewServiceConfig> = self.rest.get(url).await?;
        Ok(response.services)
    }

    // -----------------------------------------------------------------------
    // Engine host
    // -----------------------------------------------------------------------

    /// Name the metadata server that holds the engine host's governance engine definitions.
    pub async fn set_engine_definitions_client_config(
        &self,
        server_name: &str,
        omag_server_name: &str,
        omag_server_platform_root_url: &str,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/engine-definitions/client-config",
            &[],
            &serde_json::json!({
                "omag_server_name": omag_server_name,
                "omag_server_platform_root_url": omag_server_platform_root_url,
            }),
        )
        .await
    }

    pub async fn configure_engine_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
        engines: &[String],
        options: &ServiceOptions,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/engine-services/{}",
            &[service_url_marker],
            &EngineServiceRequest { engines, options },
        )
        .await
    }

    pub async fn disable_engine_service(
        &self,
        server_name: &str,
        service_url_marker: &str,
    ) -> Result<(), OmagError> {
        self.delete(server_name, "/engine-services/{}", &[service_url_marker])
            .await
    }

    pub async fn clear_engine_host_services(&self, server_name: &str) -> Result<(), OmagError> {
        self.delete(server_name, "/engine-services", &[]).await
    }

    pub async fn get_engine_services(
        &self,
        server_name: &str,
    ) -> Result<Vec<EngineServiceConfig>, OmagError> {
        let url = self.server_url(server_name, "/engine-services", &[], &[])?;
        let response: ServicesResponse<EngineServiceConfig> = self.rest.get(url).await?;
        Ok(response.services)
    }

    // -----------------------------------------------------------------------
    // Conformance suite
    // -----------------------------------------------------------------------

    pub async fn enable_repository_conformance_workbench(
        &self,
        server_name: &str,
        tut_repository_server_name: &str,
        max_search_results: usize,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/conformance-suite-workbenches/repository-workbench/repositories",
            &[],
            &serde_json::json!({
                "tut_repository_server_name": tut_repository_server_name,
                "max_search_results": max_search_results,
            }),
        )
        .await
    }

    pub async fn enable_platform_conformance_workbench(
        &self,
        server_name: &str,
        tut_platform_url: &str,
    ) -> Result<(), OmagError> {
        self.post_body(
            server_name,
            "/conformance-suite-workbenches/platform-workbench/platforms",
            &[],
            &serde_json::json!({ "tut_platform_url": tut_platform_url }),
        )
        .await
    }

    pub async fn disable_conformance_suite_services(
        &self,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.delete(server_name, "/conformance-suite-workbenches", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url_prefixes_user_and_server() {
        let client = ServerConfigurationClient::new(
            RestClient::new("http://localhost:9443").unwrap(),
            "garygeeke",
        );
        let url = client
            .server_url("cocoMDS1", "/cohorts/{}", &["cocoCohort"], &[])
            .unwrap();
        assert_eq!(
            url.path(),
            "/open-metadata/admin-services/users/garygeeke/servers/cocoMDS1/cohorts/cocoCohort"
        );
    }
}
