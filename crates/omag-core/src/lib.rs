pub mod admin;
pub mod audit;
pub mod converters;
pub mod elements;
pub mod error;
pub mod handlers;
pub mod instances;
pub mod memory;
pub mod models;
pub mod operations;
pub mod repository;
pub mod validation;

pub use admin::{
    ConfigStore, FileConfigStore, OmagServerConfig, PlatformSecurity, ServerConfigurationService,
};
pub use error::OmagError;
pub use handlers::{DatabaseHandler, MetadataSourceHandler, Paging, ServiceZones};
pub use memory::InMemoryRepository;
pub use operations::{
    InMemoryConnectorFactory, RepositoryConnectorFactory, ServerOperationsService, ServerStatus,
    ServerType,
};
pub use repository::{EntityQuery, MetadataCollection};
