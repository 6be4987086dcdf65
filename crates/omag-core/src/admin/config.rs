//! The configuration document of an OMAG server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditLogDestinationConfig;

pub type ServiceOptions = serde_json::Map<String, serde_json::Value>;

pub const CONFIG_VERSION: &str = "V2.0";
pub const DEFAULT_SERVER_URL: &str = "https://localhost:9443";
pub const DEFAULT_SERVER_USER_ID: &str = "OMAGServer";
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmagServerConfig {
    pub version: String,
    pub local_server_id: Uuid,
    pub local_server_name: String,
    /// Free-text label; the operational type is derived at activation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_server_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub local_server_url: String,
    pub local_server_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_server_password: Option<String>,
    /// 0 means unlimited.
    pub max_page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_bus_config: Option<EventBusConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_security: Option<ServerSecurityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_services_config: Option<RepositoryServicesConfig>,
    pub access_services_config: Vec<AccessServiceConfig>,
    pub view_services_config: Vec<ViewServiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_host_services_config: Option<EngineHostServicesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conformance_suite_config: Option<ConformanceSuiteConfig>,
    /// One line per configuration change, oldest first.
    pub audit_trail: Vec<String>,
}

impl Default for OmagServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            local_server_id: Uuid::new_v4(),
            local_server_name: String::new(),
            local_server_type: None,
            organization_name: None,
            local_server_url: DEFAULT_SERVER_URL.to_string(),
            local_server_user_id: DEFAULT_SERVER_USER_ID.to_string(),
            local_server_password: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            event_bus_config: None,
            server_security: None,
            repository_services_config: None,
            access_services_config: Vec::new(),
            view_services_config: Vec::new(),
            engine_host_services_config: None,
            conformance_suite_config: None,
            audit_trail: Vec::new(),
        }
    }
}

impl OmagServerConfig {
    pub fn new(server_name: &str) -> Self {
        Self {
            local_server_name: server_name.to_string(),
            ..Default::default()
        }
    }

    /// Repository services section, created on first use.
    pub fn repository_services_mut(&mut self) -> &mut RepositoryServicesConfig {
        self.repository_services_config
            .get_or_insert_with(RepositoryServicesConfig::default)
    }

    pub fn local_repository(&self) -> Option<&LocalRepositoryConfig> {
        self.repository_services_config
            .as_ref()
            .and_then(|r| r.local_repository_config.as_ref())
    }

    pub fn cohorts(&self) -> &[CohortConfig] {
        self.repository_services_config
            .as_ref()
            .map(|r| r.cohort_configs.as_slice())
            .unwrap_or_default()
    }

    pub fn audit_log_destinations(&self) -> &[AuditLogDestinationConfig] {
        self.repository_services_config
            .as_ref()
            .map(|r| r.audit_log_destinations.as_slice())
            .unwrap_or_default()
    }

    pub fn access_service(&self, url_marker: &str) -> Option<&AccessServiceConfig> {
        self.access_services_config
            .iter()
            .find(|s| s.access_service_url_marker == url_marker)
    }

    /// Users allowed to call this server's services; empty allows everyone.
    pub fn allowed_users(&self) -> &[String] {
        self.server_security
            .as_ref()
            .map(|s| s.allowed_users.as_slice())
            .unwrap_or_default()
    }
}

/// Connection details for the event bus. Stored and validated, never opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    pub connector_provider: String,
    pub topic_url_root: String,
    pub configuration_properties: ServiceOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSecurityConfig {
    pub allowed_users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryServicesConfig {
    pub audit_log_destinations: Vec<AuditLogDestinationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_repository_config: Option<LocalRepositoryConfig>,
    pub cohort_configs: Vec<CohortConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRepositoryConfig {
    pub metadata_collection_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_collection_name: Option<String>,
    pub mode: LocalRepositoryMode,
}

impl LocalRepositoryConfig {
    pub fn new(mode: LocalRepositoryMode) -> Self {
        Self {
            metadata_collection_id: Uuid::new_v4(),
            metadata_collection_name: None,
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocalRepositoryMode {
    InMemory,
    Postgres { connection_url: String },
}

impl LocalRepositoryMode {
    pub fn label(&self) -> &'static str {
        match self {
            LocalRepositoryMode::InMemory => "in_memory",
            LocalRepositoryMode::Postgres { .. } => "postgres",
        }
    }
}

/// Membership of an open metadata repository cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub cohort_name: String,
    pub registry_store_path: String,
    pub topic_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessServiceConfig {
    pub access_service_id: u32,
    pub access_service_name: String,
    pub access_service_full_name: String,
    pub access_service_url_marker: String,
    pub access_service_options: ServiceOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewServiceConfig {
    pub view_service_id: u32,
    pub view_service_name: String,
    pub view_service_full_name: String,
    pub view_service_url_marker: String,
    /// The metadata server the view service calls.
    pub omag_server_name: String,
    pub omag_server_platform_root_url: String,
    pub view_service_options: ServiceOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineHostServicesConfig {
    /// Metadata server holding the governance engine definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omag_server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omag_server_platform_root_url: Option<String>,
    pub engine_service_configs: Vec<EngineServiceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineServiceConfig {
    pub engine_service_id: u32,
    pub engine_service_name: String,
    pub engine_service_full_name: String,
    pub engine_service_url_marker: String,
    /// Qualified names of the governance engines the service runs.
    pub engines: Vec<String>,
    pub engine_service_options: ServiceOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceSuiteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_workbench: Option<RepositoryConformanceWorkbenchConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_workbench: Option<PlatformConformanceWorkbenchConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConformanceWorkbenchConfig {
    pub tut_repository_server_name: String,
    pub max_search_results: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConformanceWorkbenchConfig {
    pub tut_platform_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_defaults() {
        let config = OmagServerConfig::new("cocoMDS1");
        assert_eq!(config.local_server_name, "cocoMDS1");
        assert_eq!(config.local_server_url, "https://localhost:9443");
        assert_eq!(config.local_server_user_id, "OMAGServer");
        assert_eq!(config.max_page_size, 1000);
        assert!(config.local_repository().is_none());
        assert!(config.cohorts().is_empty());
        assert!(config.allowed_users().is_empty());
    }

    #[test]
    fn test_partial_document_deserializes() {
        let config: OmagServerConfig = serde_json::from_str(
            r#"{
                "local_server_name": "cocoMDS2",
                "repository_services_config": {
                    "local_repository_config": {
                        "metadata_collection_id": "6f1f8f7c-5a7c-4b1f-9d1e-2f3a4b5c6d7e",
                        "mode": {"type": "postgres", "connection_url": "postgres://db/omag"}
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
        assert_eq!(
            config.local_repository().unwrap().mode,
            LocalRepositoryMode::Postgres {
                connection_url: "postgres://db/omag".into()
            }
        );
    }
}
