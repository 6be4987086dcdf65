//! Clients for the operational services of a server and the services of the platform
//! itself.

use chrono::{DateTime, Utc};
use omag_core::OmagError;
use omag_core::admin::{OmagServerConfig, RegisteredService};
use omag_core::audit::AuditLogRecord;
use serde::{Deserialize, Serialize};

use crate::rest::{RestClient, ServerListResponse, Void};

const OPERATIONS_BASE: &str = "/open-metadata/admin-services/users/{}/servers/{}";
const PLATFORM_BASE: &str = "/open-metadata/platform-services/users/{}/server-platform";

/// Status of a server as reported by its platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatusReport {
    pub server_name: String,
    pub server_type: Option<String>,
    pub is_active: bool,
    pub server_start_time: Option<DateTime<Utc>>,
    pub server_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformHealth {
    pub status: String,
    pub version: String,
    pub active_servers: usize,
}

#[derive(Deserialize)]
struct SuccessMessageResponse {
    success_message: String,
}

#[derive(Deserialize)]
struct ServerConfigResponse {
    omag_server_config: OmagServerConfig,
}

#[derive(Deserialize)]
struct ServicesResponse<T> {
    services: Vec<T>,
}

#[derive(Deserialize)]
struct AuditLogResponse {
    records: Vec<AuditLogRecord>,
}

#[derive(Deserialize)]
struct PlatformOriginResponse {
    origin: String,
}

// ---------------------------------------------------------------------------
// ServerOperationsClient
// ---------------------------------------------------------------------------

/// Starts, stops and inspects servers on a remote platform.
#[derive(Clone)]
pub struct ServerOperationsClient {
    rest: RestClient,
    user_id: String,
}

impl ServerOperationsClient {
    pub fn new(rest: RestClient, user_id: impl Into<String>) -> Self {
        Self {
            rest,
            user_id: user_id.into(),
        }
    }

    fn url(&self, server_name: &str, suffix: &str) -> Result<url::Url, OmagError> {
        self.rest.url(
            &format!("{OPERATIONS_BASE}{suffix}"),
            &[self.user_id.as_str(), server_name],
            &[],
        )
    }

    /// Start the server from its stored configuration; returns the platform's summary
    /// of the services started.
    pub async fn activate_with_stored_config(
        &self,
        server_name: &str,
    ) -> Result<String, OmagError> {
        let response: SuccessMessageResponse = self
            .rest
            .post::<(), _>(self.url(server_name, "/instance")?, None)
            .await?;
        Ok(response.success_message)
    }

    pub async fn activate_with_supplied_config(
        &self,
        server_name: &str,
        config: &OmagServerConfig,
    ) -> Result<String, OmagError> {
        let response: SuccessMessageResponse = self
            .rest
            .post(self.url(server_name, "/instance/configuration")?, Some(config))
            .await?;
        Ok(response.success_message)
    }

    pub async fn deactivate_temporarily(&self, server_name: &str) -> Result<(), OmagError> {
        self.rest
            .delete::<Void>(self.url(server_name, "/instance")?)
            .await?;
        Ok(())
    }

    /// Stop the server and delete its stored configuration.
    pub async fn deactivate_permanently(&self, server_name: &str) -> Result<(), OmagError> {
        self.rest.delete::<Void>(self.url(server_name, "")?).await?;
        Ok(())
    }

    pub async fn get_active_configuration(
        &self,
        server_name: &str,
    ) -> Result<OmagServerConfig, OmagError> {
        let response: ServerConfigResponse = self
            .rest
            .get(self.url(server_name, "/instance/configuration")?)
            .await?;
        Ok(response.omag_server_config)
    }

    pub async fn get_server_status(
        &self,
        server_name: &str,
    ) -> Result<ServerStatusReport, OmagError> {
        self.rest
            .get(self.url(server_name, "/instance/status")?)
            .await
    }

    pub async fn get_active_services(&self, server_name: &str) -> Result<Vec<String>, OmagError> {
        let response: ServicesResponse<String> = self
            .rest
            .get(self.url(server_name, "/instance/services")?)
            .await?;
        Ok(response.services)
    }

    pub async fn get_audit_log_records(
        &self,
        server_name: &str,
    ) -> Result<Vec<AuditLogRecord>, OmagError> {
        let response: AuditLogResponse = self
            .rest
            .get(self.url(server_name, "/instance/audit-log")?)
            .await?;
        Ok(response.records)
    }
}

// ---------------------------------------------------------------------------
// PlatformServicesClient
// ---------------------------------------------------------------------------

/// Queries the platform: its origin, the servers it knows and the services it supports.
#[derive(Clone)]
pub struct PlatformServicesClient {
    rest: RestClient,
    user_id: String,
}

impl PlatformServicesClient {
    pub fn new(rest: RestClient, user_id: impl Into<String>) -> Self {
        Self {
            rest,
            user_id: user_id.into(),
        }
    }

    fn url(&self, suffix: &str) -> Result<url::Url, OmagError> {
        self.rest.url(
            &format!("{PLATFORM_BASE}{suffix}"),
            &[self.user_id.as_str()],
            &[],
        )
    }

    pub async fn health(&self) -> Result<PlatformHealth, OmagError> {
        self.rest.get(self.rest.url("/health", &[], &[])?).await
    }

    pub async fn get_platform_origin(&self) -> Result<String, OmagError> {
        let response: PlatformOriginResponse = self.rest.get(self.url("/origin")?).await?;
        Ok(response.origin)
    }

    pub async fn list_known_servers(&self) -> Result<Vec<String>, OmagError> {
        let response: ServerListResponse = self.rest.get(self.url("/servers")?).await?;
        Ok(response.server_list)
    }

    pub async fn list_active_servers(&self) -> Result<Vec<String>, OmagError> {
        let response: ServerListResponse = self.rest.get(self.url("/servers/active")?).await?;
        Ok(response.server_list)
    }

    pub async fn shutdown_all_servers(&self) -> Result<(), OmagError> {
        self.rest
            .delete::<Void>(self.url("/servers/active")?)
            .await?;
        Ok(())
    }

    pub async fn list_registered_access_services(
        &self,
    ) -> Result<Vec<RegisteredService>, OmagError> {
        self.registered("access-services").await
    }

    pub async fn list_registered_view_services(&self) -> Result<Vec<RegisteredService>, OmagError> {
        self.registered("view-services").await
    }

    pub async fn list_registered_engine_services(
        &self,
    ) -> Result<Vec<RegisteredService>, OmagError> {
        self.registered("engine-services").await
    }

    async fn registered(&self, kind: &str) -> Result<Vec<RegisteredService>, OmagError> {
        let response: ServicesResponse<RegisteredService> = self
            .rest
            .get(self.url(&format!("/registered-services/{kind}"))?)
            .await?;
        Ok(response.services)
    }
}
