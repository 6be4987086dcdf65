//! Administration services: building, storing and securing server configuration.

pub mod config;
pub mod registration;
pub mod security;
pub mod service;
pub mod store;

pub use config::{
    AccessServiceConfig, CohortConfig, EventBusConfig, LocalRepositoryConfig, LocalRepositoryMode,
    OmagServerConfig, ServerSecurityConfig, ServiceOptions, ViewServiceConfig,
};
pub use registration::{RegisteredService, ServiceKind};
pub use security::PlatformSecurity;
pub use service::{ServerConfigurationService, ViewServiceRequest};
pub use store::{ConfigStore, FileConfigStore, InMemoryConfigStore};
