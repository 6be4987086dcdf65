//! Operational services: starting, stopping and reporting on OMAG servers.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::admin::config::{LocalRepositoryConfig, LocalRepositoryMode, OmagServerConfig};
use crate::admin::registration::DATA_MANAGER_URL_MARKER;
use crate::admin::security::PlatformSecurity;
use crate::admin::store::ConfigStore;
use crate::audit::{AuditLog, AuditLogRecord, AuditLogSeverity};
use crate::error::OmagError;
use crate::handlers::{DatabaseHandler, MetadataSourceHandler, ServiceZones};
use crate::memory::InMemoryRepository;
use crate::repository::MetadataCollection;
use crate::validation::{validate_server_name, validate_user_id};

const COMPONENT: &str = "OMAG Server Operational Services";

// ---------------------------------------------------------------------------
// Repository connectors
// ---------------------------------------------------------------------------

/// Opens the local metadata repository of a server being activated.
#[async_trait]
pub trait RepositoryConnectorFactory: Send + Sync {
    async fn connect(
        &self,
        server_name: &str,
        config: &LocalRepositoryConfig,
    ) -> Result<Arc<dyn MetadataCollection>, OmagError>;
}

/// Serves in-memory repositories only. Each activation starts with an empty repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryConnectorFactory;

#[async_trait]
impl RepositoryConnectorFactory for InMemoryConnectorFactory {
    async fn connect(
        &self,
        server_name: &str,
        config: &LocalRepositoryConfig,
    ) -> Result<Arc<dyn MetadataCollection>, OmagError> {
        match &config.mode {
            LocalRepositoryMode::InMemory => Ok(Arc::new(InMemoryRepository::new())),
            other => Err(OmagError::Configuration(format!(
                "server {server_name} requests a {} repository, which this platform cannot open",
                other.label()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Server types and status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerType {
    #[serde(rename = "Metadata Server")]
    MetadataServer,
    #[serde(rename = "Metadata Access Point")]
    MetadataAccessPoint,
    #[serde(rename = "View Server")]
    ViewServer,
    #[serde(rename = "Engine Host")]
    EngineHost,
    #[serde(rename = "Conformance Suite Server")]
    ConformanceSuiteServer,
    #[serde(rename = "Cohort Member")]
    CohortMember,
}

impl ServerType {
    pub fn label(&self) -> &'static str {
        match self {
            ServerType::MetadataServer => "Metadata Server",
            ServerType::MetadataAccessPoint => "Metadata Access Point",
            ServerType::ViewServer => "View Server",
            ServerType::EngineHost => "Engine Host",
            ServerType::ConformanceSuiteServer => "Conformance Suite Server",
            ServerType::CohortMember => "Cohort Member",
        }
    }

    /// Derive the operational type from the subsystems a configuration enables.
    pub fn classify(config: &OmagServerConfig) -> Option<Self> {
        if config.conformance_suite_config.is_some() {
            Some(ServerType::ConformanceSuiteServer)
        } else if config.local_repository().is_some() {
            Some(ServerType::MetadataServer)
        } else if !config.access_services_config.is_empty() {
            Some(ServerType::MetadataAccessPoint)
        } else if !config.view_services_config.is_empty() {
            Some(ServerType::ViewServer)
        } else if config.engine_host_services_config.is_some() {
            Some(ServerType::EngineHost)
        } else if !config.cohorts().is_empty() {
            Some(ServerType::CohortMember)
        } else {
            None
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub server_name: String,
    pub server_type: Option<ServerType>,
    pub is_active: bool,
    pub server_start_time: Option<DateTime<Utc>>,
    pub server_end_time: Option<DateTime<Utc>>,
}

impl ServerStatus {
    fn unknown(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            server_type: None,
            is_active: false,
            server_start_time: None,
            server_end_time: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Running servers
// ---------------------------------------------------------------------------

/// Handlers serving the data-manager access service of one running server.
#[derive(Clone)]
pub struct DataManagerInstance {
    pub metadata_sources: MetadataSourceHandler,
    pub databases: DatabaseHandler,
}

/// A server that has been activated on this platform.
pub struct ServerInstance {
    pub config: OmagServerConfig,
    pub server_type: ServerType,
    pub audit_log: AuditLog,
    pub repository: Option<Arc<dyn MetadataCollection>>,
    /// Full names of the services started, in start order.
    pub services: Vec<String>,
    pub data_manager: Option<DataManagerInstance>,
}

struct ServerEntry {
    status: ServerStatus,
    instance: Option<Arc<ServerInstance>>,
}

/// Check a configuration document can be started.
pub fn validate_configuration(
    server_name: &str,
    config: &OmagServerConfig,
) -> Result<ServerType, OmagError> {
    if config.local_server_name != server_name {
        return Err(OmagError::Configuration(format!(
            "the configuration document names server {} but was supplied for {server_name}",
            config.local_server_name
        )));
    }
    if config.local_server_user_id.trim().is_empty() {
        return Err(OmagError::Configuration(format!(
            "server {server_name} has no server user id"
        )));
    }
    if !config.cohorts().is_empty() && config.event_bus_config.is_none() {
        return Err(OmagError::Configuration(format!(
            "server {server_name} joins a cohort but has no event bus"
        )));
    }
    if !config.access_services_config.is_empty()
        && config.local_repository().is_none()
        && config.cohorts().is_empty()
    {
        return Err(OmagError::Configuration(format!(
            "server {server_name} runs access services but has neither a local repository \
             nor a cohort"
        )));
    }
    if let Some(view) = config.view_services_config.iter().find(|v| {
        v.omag_server_name.trim().is_empty() || v.omag_server_platform_root_url.trim().is_empty()
    }) {
        return Err(OmagError::Configuration(format!(
            "view service {} of server {server_name} does not name its metadata server",
            view.view_service_url_marker
        )));
    }
    if let Some(engine_host) = &config.engine_host_services_config {
        if engine_host.omag_server_name.is_none()
            || engine_host.omag_server_platform_root_url.is_none()
        {
            return Err(OmagError::Configuration(format!(
                "engine host {server_name} does not name the metadata server holding its \
                 engine definitions"
            )));
        }
    }
    if let Some(suite) = &config.conformance_suite_config {
        if suite.repository_workbench.is_some() && config.cohorts().is_empty() {
            return Err(OmagError::Configuration(format!(
                "the repository workbench of {server_name} needs a cohort to test through"
            )));
        }
    }
    ServerType::classify(config).ok_or_else(|| {
        OmagError::Configuration(format!("server {server_name} has no services configured"))
    })
}

/// Starts, stops and reports on the servers running on this platform.
pub struct ServerOperationsService {
    store: Arc<dyn ConfigStore>,
    security: PlatformSecurity,
    connectors: Arc<dyn RepositoryConnectorFactory>,
    servers: RwLock<HashMap<String, ServerEntry>>,
}

impl ServerOperationsService {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        security: PlatformSecurity,
        connectors: Arc<dyn RepositoryConnectorFactory>,
    ) -> Self {
        Self {
            store,
            security,
            connectors,
            servers: RwLock::new(HashMap::new()),
        }
    }

    fn check(&self, user_id: &str, server_name: &str) -> Result<(), OmagError> {
        self.security.check_admin(user_id)?;
        validate_server_name(server_name)
    }

    async fn instance(&self, server_name: &str) -> Result<Arc<ServerInstance>, OmagError> {
        self.servers
            .read()
            .await
            .get(server_name)
            .and_then(|entry| entry.instance.clone())
            .ok_or_else(|| OmagError::ServerNotActive(server_name.to_string()))
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    pub async fn activate_with_stored_config(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<String, OmagError> {
        self.check(user_id, server_name)?;
        let config = self.store.load(server_name).await?.ok_or_else(|| {
            OmagError::Configuration(format!("no configuration is stored for server {server_name}"))
        })?;
        self.activate(server_name, config).await
    }

    /// Start a server from a document that is not stored. A running server is restarted.
    pub async fn activate_with_supplied_config(
        &self,
        user_id: &str,
        server_name: &str,
        config: OmagServerConfig,
    ) -> Result<String, OmagError> {
        self.check(user_id, server_name)?;
        self.activate(server_name, config).await
    }

    async fn activate(
        &self,
        server_name: &str,
        config: OmagServerConfig,
    ) -> Result<String, OmagError> {
        let server_type = validate_configuration(server_name, &config)?;
        let instance = self.start_instance(config, server_type).await?;
        let message = format!(
            "{server_name} is running the following services: [{}]",
            instance.services.join(", ")
        );

        let mut servers = self.servers.write().await;
        if let Some(previous) = servers
            .get_mut(server_name)
            .and_then(|entry| entry.instance.take())
        {
            tracing::info!(server = %server_name, "Restarting server");
            Self::log_shutdown(&previous);
        }
        servers.insert(
            server_name.to_string(),
            ServerEntry {
                status: ServerStatus {
                    server_name: server_name.to_string(),
                    server_type: Some(server_type),
                    is_active: true,
                    server_start_time: Some(Utc::now()),
                    server_end_time: None,
                },
                instance: Some(Arc::new(instance)),
            },
        );
        tracing::info!(server = %server_name, %server_type, "Server activated");
        Ok(message)
    }

    async fn start_instance(
        &self,
        config: OmagServerConfig,
        server_type: ServerType,
    ) -> Result<ServerInstance, OmagError> {
        let server_name = config.local_server_name.clone();
        let audit_log = AuditLog::new(&server_name, config.audit_log_destinations())?;
        audit_log.log(
            COMPONENT,
            AuditLogSeverity::Startup,
            "OMAG-ADMIN-0001",
            format!("The {server_name} server is configured as a {server_type}"),
        );

        let repository = match config.local_repository() {
            Some(local) => {
                let repository = self.connectors.connect(&server_name, local).await?;
                repository.health_check().await?;
                audit_log.log(
                    "Open Metadata Repository Services",
                    AuditLogSeverity::Startup,
                    "OMRS-AUDIT-0001",
                    format!(
                        "The local repository ({}) is ready for metadata collection {}",
                        local.mode.label(),
                        local.metadata_collection_id
                    ),
                );
                Some(repository)
            }
            None => None,
        };
        for cohort in config.cohorts() {
            audit_log.log(
                "Open Metadata Repository Services",
                AuditLogSeverity::Startup,
                "OMRS-AUDIT-0002",
                format!("Registered with cohort {}", cohort.cohort_name),
            );
        }

        let mut services = Vec::new();
        let mut data_manager = None;
        for access in &config.access_services_config {
            if access.access_service_url_marker == DATA_MANAGER_URL_MARKER {
                data_manager = repository.as_ref().map(|repository| DataManagerInstance {
                    metadata_sources: MetadataSourceHandler::new(repository.clone()),
                    databases: DatabaseHandler::new(
                        repository.clone(),
                        ServiceZones::from_options(&access.access_service_options),
                        config.max_page_size,
                    ),
                });
            }
            services.push(access.access_service_full_name.clone());
        }
        services.extend(
            config
                .view_services_config
                .iter()
                .map(|v| v.view_service_full_name.clone()),
        );
        if let Some(engine_host) = &config.engine_host_services_config {
            services.extend(
                engine_host
                    .engine_service_configs
                    .iter()
                    .map(|e| e.engine_service_full_name.clone()),
            );
        }
        if let Some(suite) = &config.conformance_suite_config {
            if suite.repository_workbench.is_some() {
                services.push("Repository Conformance Workbench".to_string());
            }
            if suite.platform_workbench.is_some() {
                services.push("Platform Conformance Workbench".to_string());
            }
        }
        for service in &services {
            audit_log.log(
                COMPONENT,
                AuditLogSeverity::Startup,
                "OMAG-ADMIN-0003",
                format!("The {service} has started"),
            );
        }
        audit_log.log(
            COMPONENT,
            AuditLogSeverity::Startup,
            "OMAG-ADMIN-0004",
            format!(
                "The {server_name} server has started {} service(s)",
                services.len()
            ),
        );

        Ok(ServerInstance {
            config,
            server_type,
            audit_log,
            repository,
            services,
            data_manager,
        })
    }

    fn log_shutdown(instance: &ServerInstance) {
        instance.audit_log.log(
            COMPONENT,
            AuditLogSeverity::Shutdown,
            "OMAG-ADMIN-0005",
            format!(
                "The {} server is shutting down",
                instance.config.local_server_name
            ),
        );
    }

    // -----------------------------------------------------------------------
    // Deactivation
    // -----------------------------------------------------------------------

    /// Stop a server, keeping its configuration. Stopping an inactive server does nothing.
    pub async fn deactivate_temporarily(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.check(user_id, server_name)?;
        self.stop(server_name).await;
        Ok(())
    }

    /// Stop a server and delete its stored configuration.
    pub async fn deactivate_permanently(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.check(user_id, server_name)?;
        self.stop(server_name).await;
        self.servers.write().await.remove(server_name);
        self.store.delete(server_name).await?;
        tracing::info!(server = %server_name, "Server deleted");
        Ok(())
    }

    async fn stop(&self, server_name: &str) {
        let mut servers = self.servers.write().await;
        let Some(entry) = servers.get_mut(server_name) else {
            return;
        };
        if let Some(instance) = entry.instance.take() {
            Self::log_shutdown(&instance);
            entry.status.is_active = false;
            entry.status.server_end_time = Some(Utc::now());
            tracing::info!(server = %server_name, "Server deactivated");
        }
    }

    /// Stop every running server.
    pub async fn shutdown_all(&self) {
        let mut servers = self.servers.write().await;
        for (server_name, entry) in servers.iter_mut() {
            if let Some(instance) = entry.instance.take() {
                Self::log_shutdown(&instance);
                entry.status.is_active = false;
                entry.status.server_end_time = Some(Utc::now());
                tracing::info!(server = %server_name, "Server deactivated");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_active_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<OmagServerConfig, OmagError> {
        self.check(user_id, server_name)?;
        Ok(self.instance(server_name).await?.config.clone())
    }

    /// Status of a server; stopped servers keep their last start and end times.
    pub async fn get_server_status(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<ServerStatus, OmagError> {
        self.check(user_id, server_name)?;
        Ok(self
            .servers
            .read()
            .await
            .get(server_name)
            .map(|entry| entry.status.clone())
            .unwrap_or_else(|| ServerStatus::unknown(server_name)))
    }

    pub async fn active_server_count(&self) -> usize {
        self.servers
            .read()
            .await
            .values()
            .filter(|entry| entry.instance.is_some())
            .count()
    }

    pub async fn list_active_servers(&self, user_id: &str) -> Result<Vec<String>, OmagError> {
        self.security.check_admin(user_id)?;
        let mut names: Vec<String> = self
            .servers
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.instance.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Servers with a stored configuration or that have run since the platform started.
    pub async fn list_known_servers(&self, user_id: &str) -> Result<Vec<String>, OmagError> {
        self.security.check_admin(user_id)?;
        let mut names: BTreeSet<String> = self.store.list().await?.into_iter().collect();
        names.extend(self.servers.read().await.keys().cloned());
        Ok(names.into_iter().collect())
    }

    pub async fn get_active_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<Vec<String>, OmagError> {
        self.check(user_id, server_name)?;
        Ok(self.instance(server_name).await?.services.clone())
    }

    pub async fn get_audit_log_records(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<Vec<AuditLogRecord>, OmagError> {
        self.check(user_id, server_name)?;
        Ok(self.instance(server_name).await?.audit_log.records())
    }

    /// Resolve the handlers for a data-manager request.
    pub async fn data_manager_instance(
        &self,
        server_name: &str,
        user_id: &str,
    ) -> Result<DataManagerInstance, OmagError> {
        validate_server_name(server_name)?;
        validate_user_id(user_id)?;
        let instance = self.instance(server_name).await?;

        let allowed = instance.config.allowed_users();
        if !allowed.is_empty() && !allowed.iter().any(|u| u == user_id) {
            instance.audit_log.log(
                "Data Manager OMAS",
                AuditLogSeverity::Security,
                "OMAG-SECURITY-0001",
                format!("User {user_id} is not authorized to call server {server_name}"),
            );
            return Err(OmagError::not_authorized(
                user_id,
                format!("the user may not call server {server_name}"),
            ));
        }

        if instance.config.access_service(DATA_MANAGER_URL_MARKER).is_none() {
            return Err(OmagError::ServiceNotActive {
                server: server_name.to_string(),
                service: DATA_MANAGER_URL_MARKER.to_string(),
            });
        }
        instance.data_manager.clone().ok_or_else(|| {
            OmagError::PropertyServer(format!(
                "server {server_name} has no local repository to serve the data manager"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::config::{
        AccessServiceConfig, CohortConfig, EngineHostServicesConfig, EventBusConfig,
        RepositoryServicesConfig, ServerSecurityConfig, ViewServiceConfig,
    };
    use crate::admin::store::InMemoryConfigStore;
    use crate::audit::{AuditLogDestination, AuditLogDestinationConfig};
    use crate::models::DatabaseManagerProperties;

    fn service() -> ServerOperationsService {
        ServerOperationsService::new(
            Arc::new(InMemoryConfigStore::new()),
            PlatformSecurity::default(),
            Arc::new(InMemoryConnectorFactory),
        )
    }

    fn data_manager_access() -> AccessServiceConfig {
        AccessServiceConfig {
            access_service_id: 205,
            access_service_name: "Data Manager".into(),
            access_service_full_name: "Data Manager OMAS".into(),
            access_service_url_marker: "data-manager".into(),
            access_service_options: Default::default(),
        }
    }

    fn metadata_server(name: &str) -> OmagServerConfig {
        let mut config = OmagServerConfig::new(name);
        config.repository_services_config = Some(RepositoryServicesConfig {
            audit_log_destinations: vec![AuditLogDestinationConfig {
                destination: AuditLogDestination::InMemory { max_records: 100 },
                supported_severities: vec![],
            }],
            local_repository_config: Some(LocalRepositoryConfig::new(
                LocalRepositoryMode::InMemory,
            )),
            cohort_configs: vec![],
        });
        config.access_services_config.push(data_manager_access());
        config
    }

    #[tokio::test]
    async fn test_activate_and_use_data_manager() {
        let ops = service();
        let message = ops
            .activate_with_supplied_config("garygeeke", "cocoMDS1", metadata_server("cocoMDS1"))
            .await
            .unwrap();
        assert!(message.contains("Data Manager OMAS"));

        let dm = ops.data_manager_instance("cocoMDS1", "erinoverview").await.unwrap();
        let manager = dm
            .metadata_sources
            .create_database_manager(
                "erinoverview",
                &DatabaseManagerProperties {
                    qualified_name: "Coco.DBMS".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            dm.metadata_sources
                .get_metadata_source_guid("erinoverview", "Coco.DBMS")
                .await
                .unwrap(),
            manager
        );

        let status = ops.get_server_status("garygeeke", "cocoMDS1").await.unwrap();
        assert!(status.is_active);
        assert_eq!(status.server_type, Some(ServerType::MetadataServer));
        assert_eq!(
            ops.list_active_servers("garygeeke").await.unwrap(),
            vec!["cocoMDS1"]
        );
        let records = ops.get_audit_log_records("garygeeke", "cocoMDS1").await.unwrap();
        assert!(records.iter().any(|r| r.message_id == "OMAG-ADMIN-0004"));
    }

    #[tokio::test]
    async fn test_stored_config_required() {
        let ops = service();
        let err = ops
            .activate_with_stored_config("garygeeke", "cocoMDS1")
            .await
            .unwrap_err();
        assert!(matches!(err, OmagError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_activate_with_stored_config() {
        let store = Arc::new(InMemoryConfigStore::new());
        store.save(&metadata_server("cocoMDS1")).await.unwrap();
        let ops = ServerOperationsService::new(
            store.clone(),
            PlatformSecurity::default(),
            Arc::new(InMemoryConnectorFactory),
        );
        ops.activate_with_stored_config("garygeeke", "cocoMDS1")
            .await
            .unwrap();
        assert_eq!(
            ops.get_active_services("garygeeke", "cocoMDS1").await.unwrap(),
            vec!["Data Manager OMAS"]
        );

        ops.deactivate_permanently("garygeeke", "cocoMDS1").await.unwrap();
        assert!(store.load("cocoMDS1").await.unwrap().is_none());
        assert!(ops.list_known_servers("garygeeke").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_keeps_times() {
        let ops = service();
        ops.activate_with_supplied_config("u", "cocoMDS1", metadata_server("cocoMDS1"))
            .await
            .unwrap();
        ops.deactivate_temporarily("u", "cocoMDS1").await.unwrap();
        ops.deactivate_temporarily("u", "cocoMDS1").await.unwrap();

        let status = ops.get_server_status("u", "cocoMDS1").await.unwrap();
        assert!(!status.is_active);
        assert!(status.server_start_time.is_some());
        assert!(status.server_end_time.is_some());
        assert!(matches!(
            ops.get_active_configuration("u", "cocoMDS1").await,
            Err(OmagError::ServerNotActive(_))
        ));
        assert_eq!(ops.list_known_servers("u").await.unwrap(), vec!["cocoMDS1"]);
    }

    #[tokio::test]
    async fn test_restart_gives_fresh_repository() {
        let ops = service();
        ops.activate_with_supplied_config("u", "cocoMDS1", metadata_server("cocoMDS1"))
            .await
            .unwrap();
        let dm = ops.data_manager_instance("cocoMDS1", "u").await.unwrap();
        dm.metadata_sources
            .create_database_manager(
                "u",
                &DatabaseManagerProperties {
                    qualified_name: "Coco.DBMS".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        ops.activate_with_supplied_config("u", "cocoMDS1", metadata_server("cocoMDS1"))
            .await
            .unwrap();
        let dm = ops.data_manager_instance("cocoMDS1", "u").await.unwrap();
        assert!(dm
            .metadata_sources
            .get_metadata_source_guid("u", "Coco.DBMS")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_data_manager_errors() {
        let ops = service();
        assert!(matches!(
            ops.data_manager_instance("cocoMDS1", "u").await,
            Err(OmagError::ServerNotActive(_))
        ));

        let mut secured = metadata_server("cocoMDS1");
        secured.server_security = Some(ServerSecurityConfig {
            allowed_users: vec!["erinoverview".into()],
        });
        ops.activate_with_supplied_config("u", "cocoMDS1", secured)
            .await
            .unwrap();
        assert!(matches!(
            ops.data_manager_instance("cocoMDS1", "peterprofile").await,
            Err(OmagError::UserNotAuthorized { .. })
        ));
        assert!(ops.data_manager_instance("cocoMDS1", "erinoverview").await.is_ok());

        let mut no_service = metadata_server("cocoMDS2");
        no_service.access_services_config.clear();
        ops.activate_with_supplied_config("u", "cocoMDS2", no_service)
            .await
            .unwrap();
        assert!(matches!(
            ops.data_manager_instance("cocoMDS2", "u").await,
            Err(OmagError::ServiceNotActive { .. })
        ));

        let mut access_point = OmagServerConfig::new("cocoMAP");
        access_point.event_bus_config = Some(EventBusConfig::default());
        access_point.repository_services_mut().cohort_configs.push(CohortConfig {
            cohort_name: "cocoCohort".into(),
            ..Default::default()
        });
        access_point.access_services_config.push(data_manager_access());
        ops.activate_with_supplied_config("u", "cocoMAP", access_point)
            .await
            .unwrap();
        let status = ops.get_server_status("u", "cocoMAP").await.unwrap();
        assert_eq!(status.server_type, Some(ServerType::MetadataAccessPoint));
        assert!(matches!(
            ops.data_manager_instance("cocoMAP", "u").await,
            Err(OmagError::PropertyServer(_))
        ));
    }

    #[test]
    fn test_configuration_validation() {
        assert!(matches!(
            validate_configuration("cocoMDS1", &OmagServerConfig::new("cocoMDS1")),
            Err(OmagError::Configuration(_))
        ));
        assert!(validate_configuration("other", &metadata_server("cocoMDS1")).is_err());

        let mut cohort_only = OmagServerConfig::new("s");
        cohort_only.repository_services_mut().cohort_configs.push(CohortConfig::default());
        assert!(validate_configuration("s", &cohort_only).is_err());
        cohort_only.event_bus_config = Some(EventBusConfig::default());
        assert_eq!(
            validate_configuration("s", &cohort_only).unwrap(),
            ServerType::CohortMember
        );

        let mut no_repository = OmagServerConfig::new("s");
        no_repository.access_services_config.push(data_manager_access());
        assert!(validate_configuration("s", &no_repository).is_err());

        let mut view = OmagServerConfig::new("s");
        view.view_services_config.push(ViewServiceConfig {
            view_service_url_marker: "rex".into(),
            ..Default::default()
        });
        assert!(validate_configuration("s", &view).is_err());
        view.view_services_config[0].omag_server_name = "cocoMDS1".into();
        view.view_services_config[0].omag_server_platform_root_url =
            "https://localhost:9443".into();
        assert_eq!(validate_configuration("s", &view).unwrap(), ServerType::ViewServer);

        let mut engine_host = OmagServerConfig::new("s");
        engine_host.engine_host_services_config = Some(EngineHostServicesConfig::default());
        assert!(validate_configuration("s", &engine_host).is_err());

        let mut blank_user = metadata_server("s");
        blank_user.local_server_user_id = String::new();
        assert!(validate_configuration("s", &blank_user).is_err());
    }

    #[tokio::test]
    async fn test_postgres_needs_platform_connector() {
        let ops = service();
        let mut config = metadata_server("cocoMDS1");
        config.repository_services_mut().local_repository_config =
            Some(LocalRepositoryConfig::new(LocalRepositoryMode::Postgres {
                connection_url: "postgres://localhost/omag".into(),
            }));
        assert!(matches!(
            ops.activate_with_supplied_config("u", "cocoMDS1", config).await,
            Err(OmagError::Configuration(_))
        ));
        assert!(ops.list_active_servers("u").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_all() {
        let ops = service();
        ops.activate_with_supplied_config("u", "a", metadata_server("a"))
            .await
            .unwrap();
        ops.activate_with_supplied_config("u", "b", metadata_server("b"))
            .await
            .unwrap();
        ops.shutdown_all().await;
        assert!(ops.list_active_servers("u").await.unwrap().is_empty());
    }
}
