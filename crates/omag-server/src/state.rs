use std::sync::Arc;

use omag_core::OmagError;
use omag_core::admin::{ConfigStore, PlatformSecurity, ServerConfigurationService};
use omag_core::operations::{
    DataManagerInstance, RepositoryConnectorFactory, ServerOperationsService,
};

pub const PLATFORM_ORIGIN: &str = concat!(
    "OMAG Server Platform (version ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub configuration: ServerConfigurationService,
    pub operations: ServerOperationsService,
    pub security: PlatformSecurity,
    /// Bearer token protecting the service routes (None = open).
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        security: PlatformSecurity,
        connectors: Arc<dyn RepositoryConnectorFactory>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            configuration: ServerConfigurationService::new(store.clone(), security.clone()),
            operations: ServerOperationsService::new(store, security.clone(), connectors),
            security,
            api_key,
        }
    }

    pub async fn data_manager(
        &self,
        server_name: &str,
        user_id: &str,
    ) -> Result<DataManagerInstance, OmagError> {
        self.operations
            .data_manager_instance(server_name, user_id)
            .await
    }
}
