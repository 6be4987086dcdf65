use std::sync::Arc;

use chrono::Utc;

use super::config::{
    AccessServiceConfig, CohortConfig, ConformanceSuiteConfig, EngineServiceConfig,
    EventBusConfig, LocalRepositoryConfig, LocalRepositoryMode, OmagServerConfig,
    PlatformConformanceWorkbenchConfig, RepositoryConformanceWorkbenchConfig,
    ServerSecurityConfig, ServiceOptions, ViewServiceConfig,
};
use super::registration::{self, RegisteredService};
use super::security::PlatformSecurity;
use super::store::ConfigStore;
use crate::audit::AuditLogDestinationConfig;
use crate::error::OmagError;
use crate::validation::{validate_name, validate_server_name, validate_url, validate_url_marker};

pub const DEFAULT_EVENT_BUS_PROVIDER: &str = "kafka";
pub const DEFAULT_TOPIC_URL_ROOT: &str = "omag";

/// Details of the metadata server a view service calls.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewServiceRequest {
    pub omag_server_name: String,
    pub omag_server_platform_root_url: String,
    pub view_service_options: ServiceOptions,
}

/// Builds and stores server configuration documents.
///
/// Every operation checks the caller is a platform administrator, loads the stored
/// document (or starts a new one), applies the change, records it in the audit trail
/// and saves the result.
#[derive(Clone)]
pub struct ServerConfigurationService {
    store: Arc<dyn ConfigStore>,
    security: PlatformSecurity,
}

impl ServerConfigurationService {
    pub fn new(store: Arc<dyn ConfigStore>, security: PlatformSecurity) -> Self {
        Self { store, security }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    fn check(&self, user_id: &str, server_name: &str) -> Result<(), OmagError> {
        self.security.check_admin(user_id)?;
        validate_server_name(server_name)
    }

    async fn load_or_default(&self, server_name: &str) -> Result<OmagServerConfig, OmagError> {
        Ok(self
            .store
            .load(server_name)
            .await?
            .unwrap_or_else(|| OmagServerConfig::new(server_name)))
    }

    /// Load → mutate → audit → save.
    async fn update<F>(
        &self,
        user_id: &str,
        server_name: &str,
        action: &str,
        mutate: F,
    ) -> Result<OmagServerConfig, OmagError>
    where
        F: FnOnce(&mut OmagServerConfig) -> Result<(), OmagError> + Send,
    {
        self.check(user_id, server_name)?;
        let mut config = self.load_or_default(server_name).await?;
        mutate(&mut config)?;
        config.audit_trail.push(format!(
            "{} {} {}",
            Utc::now().to_rfc3339(),
            user_id,
            action
        ));
        self.store.save(&config).await?;
        tracing::info!(server = %server_name, %user_id, %action, "Configuration updated");
        Ok(config)
    }

    // -----------------------------------------------------------------------
    // Whole documents
    // -----------------------------------------------------------------------

    pub async fn get_stored_configuration(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<OmagServerConfig, OmagError> {
        self.check(user_id, server_name)?;
        self.load_or_default(server_name).await
    }

    /// Replace the stored document. Its server name is forced to `server_name`.
    pub async fn set_omag_server_config(
        &self,
        user_id: &str,
        server_name: &str,
        config: OmagServerConfig,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "set server configuration", |stored| {
            let trail = std::mem::take(&mut stored.audit_trail);
            *stored = config;
            stored.local_server_name = server_name.to_string();
            if stored.audit_trail.is_empty() {
                stored.audit_trail = trail;
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_omag_server_config(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.check(user_id, server_name)?;
        self.store.delete(server_name).await?;
        tracing::info!(server = %server_name, %user_id, "Configuration deleted");
        Ok(())
    }

    pub async fn list_stored_configurations(
        &self,
        user_id: &str,
    ) -> Result<Vec<String>, OmagError> {
        self.security.check_admin(user_id)?;
        self.store.list().await
    }

    // -----------------------------------------------------------------------
    // Basic server properties
    // -----------------------------------------------------------------------

    pub async fn set_server_type(
        &self,
        user_id: &str,
        server_name: &str,
        type_name: Option<String>,
    ) -> Result<(), OmagError> {
        let type_name = type_name.filter(|t| !t.trim().is_empty());
        let action = format!("set server type to {type_name:?}");
        self.update(user_id, server_name, &action, |c| {
            c.local_server_type = type_name;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_organization_name(
        &self,
        user_id: &str,
        server_name: &str,
        organization_name: &str,
    ) -> Result<(), OmagError> {
        validate_name(organization_name, "organization_name")?;
        let action = format!("set organization name to {organization_name}");
        self.update(user_id, server_name, &action, |c| {
            c.organization_name = Some(organization_name.to_string());
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_server_url_root(
        &self,
        user_id: &str,
        server_name: &str,
        url_root: &str,
    ) -> Result<(), OmagError> {
        validate_url(url_root, "url_root")?;
        let action = format!("set server URL root to {url_root}");
        self.update(user_id, server_name, &action, |c| {
            c.local_server_url = url_root.trim_end_matches('/').to_string();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_server_user_id(
        &self,
        user_id: &str,
        server_name: &str,
        server_user_id: &str,
    ) -> Result<(), OmagError> {
        validate_name(server_user_id, "server_user_id")?;
        let action = format!("set server user id to {server_user_id}");
        self.update(user_id, server_name, &action, |c| {
            c.local_server_user_id = server_user_id.to_string();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_server_password(
        &self,
        user_id: &str,
        server_name: &str,
        password: &str,
    ) -> Result<(), OmagError> {
        validate_name(password, "password")?;
        self.update(user_id, server_name, "set server password", |c| {
            c.local_server_password = Some(password.to_string());
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_max_page_size(
        &self,
        user_id: &str,
        server_name: &str,
        max_page_size: usize,
    ) -> Result<(), OmagError> {
        let action = format!("set maximum page size to {max_page_size}");
        self.update(user_id, server_name, &action, |c| {
            c.max_page_size = max_page_size;
            Ok(())
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event bus and security
    // -----------------------------------------------------------------------

    pub async fn set_event_bus(
        &self,
        user_id: &str,
        server_name: &str,
        mut event_bus: EventBusConfig,
    ) -> Result<(), OmagError> {
        if event_bus.connector_provider.trim().is_empty() {
            event_bus.connector_provider = DEFAULT_EVENT_BUS_PROVIDER.to_string();
        }
        if event_bus.topic_url_root.trim().is_empty() {
            event_bus.topic_url_root = DEFAULT_TOPIC_URL_ROOT.to_string();
        }
        let action = format!("set event bus ({})", event_bus.connector_provider);
        self.update(user_id, server_name, &action, |c| {
            c.event_bus_config = Some(event_bus);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_event_bus(&self, user_id: &str, server_name: &str) -> Result<(), OmagError> {
        self.update(user_id, server_name, "cleared event bus", |c| {
            c.event_bus_config = None;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_server_security(
        &self,
        user_id: &str,
        server_name: &str,
        security: ServerSecurityConfig,
    ) -> Result<(), OmagError> {
        let action = format!(
            "set server security ({} allowed users)",
            security.allowed_users.len()
        );
        self.update(user_id, server_name, &action, |c| {
            c.server_security = Some(security);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_server_security(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "cleared server security", |c| {
            c.server_security = None;
            Ok(())
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Audit log
    // -----------------------------------------------------------------------

    /// Replace the destinations with a single console destination.
    pub async fn set_default_audit_log(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "set default audit log", |c| {
            c.repository_services_mut().audit_log_destinations =
                vec![AuditLogDestinationConfig::console()];
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn add_audit_log_destination(
        &self,
        user_id: &str,
        server_name: &str,
        destination: AuditLogDestinationConfig,
    ) -> Result<(), OmagError> {
        let action = format!("added audit log destination {:?}", destination.destination);
        self.update(user_id, server_name, &action, |c| {
            c.repository_services_mut()
                .audit_log_destinations
                .push(destination);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_audit_log_destinations(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "cleared audit log destinations", |c| {
            c.repository_services_mut().audit_log_destinations.clear();
            Ok(())
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Local repository and cohorts
    // -----------------------------------------------------------------------

    async fn set_local_repository(
        &self,
        user_id: &str,
        server_name: &str,
        mode: LocalRepositoryMode,
    ) -> Result<(), OmagError> {
        let action = format!("set local repository mode {}", mode.label());
        self.update(user_id, server_name, &action, |c| {
            let repository = c.repository_services_mut();
            match &mut repository.local_repository_config {
                // Keep the collection identity when switching modes
                Some(existing) => existing.mode = mode,
                None => repository.local_repository_config = Some(LocalRepositoryConfig::new(mode)),
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_in_memory_local_repository(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.set_local_repository(user_id, server_name, LocalRepositoryMode::InMemory)
            .await
    }

    pub async fn set_postgres_local_repository(
        &self,
        user_id: &str,
        server_name: &str,
        connection_url: &str,
    ) -> Result<(), OmagError> {
        let url = url::Url::parse(connection_url).map_err(|e| {
            OmagError::invalid_parameter("connection_url", format!("not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(OmagError::invalid_parameter(
                "connection_url",
                "a postgres:// connection URL is required",
            ));
        }
        self.set_local_repository(
            user_id,
            server_name,
            LocalRepositoryMode::Postgres {
                connection_url: connection_url.to_string(),
            },
        )
        .await
    }

    pub async fn set_no_repository_mode(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "removed local repository", |c| {
            c.repository_services_mut().local_repository_config = None;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn set_local_metadata_collection_name(
        &self,
        user_id: &str,
        server_name: &str,
        name: &str,
    ) -> Result<(), OmagError> {
        validate_name(name, "local_metadata_collection_name")?;
        let action = format!("set local metadata collection name to {name}");
        self.update(user_id, server_name, &action, |c| {
            let local = c
                .repository_services_mut()
                .local_repository_config
                .as_mut()
                .ok_or_else(|| {
                    OmagError::Configuration(format!(
                        "server {server_name} has no local repository to name"
                    ))
                })?;
            local.metadata_collection_name = Some(name.to_string());
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// Register with a cohort. Unset fields of `overrides` are derived from the event bus.
    pub async fn add_cohort_registration(
        &self,
        user_id: &str,
        server_name: &str,
        cohort_name: &str,
        overrides: Option<CohortConfig>,
    ) -> Result<(), OmagError> {
        validate_name(cohort_name, "cohort_name")?;
        let action = format!("registered with cohort {cohort_name}");
        self.update(user_id, server_name, &action, |c| {
            let event_bus = c.event_bus_config.as_ref().ok_or_else(|| {
                OmagError::Configuration(format!(
                    "server {server_name} needs an event bus before it can join \
                     cohort {cohort_name}"
                ))
            })?;
            let mut cohort = overrides.unwrap_or_default();
            cohort.cohort_name = cohort_name.to_string();
            if cohort.topic_name.is_empty() {
                cohort.topic_name = format!(
                    "{}.openmetadata.repositoryservices.cohort.{cohort_name}.OMRSTopic",
                    event_bus.topic_url_root
                );
            }
            if cohort.registry_store_path.is_empty() {
                cohort.registry_store_path =
                    format!("./data/servers/{server_name}/cohorts/{cohort_name}.registrystore");
            }
            let repository = c.repository_services_mut();
            repository
                .cohort_configs
                .retain(|existing| existing.cohort_name != cohort_name);
            repository.cohort_configs.push(cohort);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_cohort_registration(
        &self,
        user_id: &str,
        server_name: &str,
        cohort_name: &str,
    ) -> Result<(), OmagError> {
        let action = format!("unregistered from cohort {cohort_name}");
        self.update(user_id, server_name, &action, |c| {
            let repository = c.repository_services_mut();
            let before = repository.cohort_configs.len();
            repository
                .cohort_configs
                .retain(|existing| existing.cohort_name != cohort_name);
            if repository.cohort_configs.len() == before {
                return Err(OmagError::invalid_parameter(
                    "cohort_name",
                    format!("server {server_name} is not registered with cohort {cohort_name}"),
                ));
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Access services
    // -----------------------------------------------------------------------

    fn access_service_config(
        service: RegisteredService,
        options: ServiceOptions,
    ) -> AccessServiceConfig {
        AccessServiceConfig {
            access_service_id: service.service_id,
            access_service_name: service.service_name,
            access_service_full_name: service.service_full_name,
            access_service_url_marker: service.service_url_marker,
            access_service_options: options,
        }
    }

    pub async fn enable_access_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        options: ServiceOptions,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let service = registration::find_access_service(url_marker).ok_or_else(|| {
            OmagError::invalid_parameter(
                "service_url_marker",
                format!("{url_marker} is not a registered access service"),
            )
        })?;
        let action = format!("enabled access service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            c.access_services_config
                .retain(|s| s.access_service_url_marker != url_marker);
            c.access_services_config
                .push(Self::access_service_config(service, options));
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn enable_all_access_services(
        &self,
        user_id: &str,
        server_name: &str,
        options: ServiceOptions,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "enabled all access services", |c| {
            c.access_services_config = registration::access_services()
                .into_iter()
                .map(|s| Self::access_service_config(s, options.clone()))
                .collect();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_access_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let action = format!("disabled access service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            c.access_services_config
                .retain(|s| s.access_service_url_marker != url_marker);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_access_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "disabled all access services", |c| {
            c.access_services_config.clear();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn get_access_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<Vec<AccessServiceConfig>, OmagError> {
        Ok(self
            .get_stored_configuration(user_id, server_name)
            .await?
            .access_services_config)
    }

    // -----------------------------------------------------------------------
    // View services
    // -----------------------------------------------------------------------

    pub async fn enable_view_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        request: ViewServiceRequest,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let service = registration::find_view_service(url_marker).ok_or_else(|| {
            OmagError::invalid_parameter(
                "service_url_marker",
                format!("{url_marker} is not a registered view service"),
            )
        })?;
        validate_server_name(&request.omag_server_name).map_err(|_| {
            OmagError::invalid_parameter(
                "omag_server_name",
                "a view service needs the name of the metadata server it calls",
            )
        })?;
        validate_url(
            &request.omag_server_platform_root_url,
            "omag_server_platform_root_url",
        )?;

        let action = format!("enabled view service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            c.view_services_config
                .retain(|s| s.view_service_url_marker != url_marker);
            c.view_services_config.push(ViewServiceConfig {
                view_service_id: service.service_id,
                view_service_name: service.service_name,
                view_service_full_name: service.service_full_name,
                view_service_url_marker: service.service_url_marker,
                omag_server_name: request.omag_server_name,
                omag_server_platform_root_url: request.omag_server_platform_root_url,
                view_service_options: request.view_service_options,
            });
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_view_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let action = format!("disabled view service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            c.view_services_config
                .retain(|s| s.view_service_url_marker != url_marker);
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_view_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "disabled all view services", |c| {
            c.view_services_config.clear();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn get_view_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<Vec<ViewServiceConfig>, OmagError> {
        Ok(self
            .get_stored_configuration(user_id, server_name)
            .await?
            .view_services_config)
    }

    // -----------------------------------------------------------------------
    // Engine host
    // -----------------------------------------------------------------------

    /// Name the metadata server that holds the governance engine definitions.
    pub async fn set_engine_definitions_client_config(
        &self,
        user_id: &str,
        server_name: &str,
        omag_server_name: &str,
        platform_root_url: &str,
    ) -> Result<(), OmagError> {
        validate_server_name(omag_server_name)?;
        validate_url(platform_root_url, "omag_server_platform_root_url")?;
        let action = format!("set engine definitions server to {omag_server_name}");
        self.update(user_id, server_name, &action, |c| {
            let engine_host = c.engine_host_services_config.get_or_insert_with(Default::default);
            engine_host.omag_server_name = Some(omag_server_name.to_string());
            engine_host.omag_server_platform_root_url = Some(platform_root_url.to_string());
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn configure_engine_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
        engines: Vec<String>,
        options: ServiceOptions,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let service = registration::find_engine_service(url_marker).ok_or_else(|| {
            OmagError::invalid_parameter(
                "service_url_marker",
                format!("{url_marker} is not a registered engine service"),
            )
        })?;
        if engines.iter().any(|e| e.trim().is_empty()) {
            return Err(OmagError::invalid_parameter(
                "engines",
                "engine names must not be blank",
            ));
        }
        let action = format!("configured engine service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            let engine_host = c.engine_host_services_config.get_or_insert_with(Default::default);
            engine_host
                .engine_service_configs
                .retain(|s| s.engine_service_url_marker != url_marker);
            engine_host.engine_service_configs.push(EngineServiceConfig {
                engine_service_id: service.service_id,
                engine_service_name: service.service_name,
                engine_service_full_name: service.service_full_name,
                engine_service_url_marker: service.service_url_marker,
                engines,
                engine_service_options: options,
            });
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_engine_service(
        &self,
        user_id: &str,
        server_name: &str,
        url_marker: &str,
    ) -> Result<(), OmagError> {
        validate_url_marker(url_marker)?;
        let action = format!("disabled engine service {url_marker}");
        self.update(user_id, server_name, &action, |c| {
            if let Some(engine_host) = c.engine_host_services_config.as_mut() {
                engine_host
                    .engine_service_configs
                    .retain(|s| s.engine_service_url_marker != url_marker);
            }
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn clear_engine_host_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "cleared engine host services", |c| {
            c.engine_host_services_config = None;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn get_engine_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<Vec<EngineServiceConfig>, OmagError> {
        Ok(self
            .get_stored_configuration(user_id, server_name)
            .await?
            .engine_host_services_config
            .map(|e| e.engine_service_configs)
            .unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Conformance suite
    // -----------------------------------------------------------------------

    pub async fn enable_repository_conformance_workbench(
        &self,
        user_id: &str,
        server_name: &str,
        tut_repository_server_name: &str,
        max_search_results: usize,
    ) -> Result<(), OmagError> {
        validate_server_name(tut_repository_server_name)?;
        let action = format!("enabled repository workbench for {tut_repository_server_name}");
        self.update(user_id, server_name, &action, |c| {
            c.conformance_suite_config
                .get_or_insert_with(ConformanceSuiteConfig::default)
                .repository_workbench = Some(RepositoryConformanceWorkbenchConfig {
                tut_repository_server_name: tut_repository_server_name.to_string(),
                max_search_results,
            });
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn enable_platform_conformance_workbench(
        &self,
        user_id: &str,
        server_name: &str,
        tut_platform_url: &str,
    ) -> Result<(), OmagError> {
        validate_url(tut_platform_url, "tut_platform_url")?;
        let action = format!("enabled platform workbench for {tut_platform_url}");
        self.update(user_id, server_name, &action, |c| {
            c.conformance_suite_config
                .get_or_insert_with(ConformanceSuiteConfig::default)
                .platform_workbench = Some(PlatformConformanceWorkbenchConfig {
                tut_platform_url: tut_platform_url.to_string(),
            });
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn disable_conformance_suite_services(
        &self,
        user_id: &str,
        server_name: &str,
    ) -> Result<(), OmagError> {
        self.update(user_id, server_name, "disabled conformance suite services", |c| {
            c.conformance_suite_config = None;
            Ok(())
        })
        .await?;
        Ok(())
    }
}
