pub mod admin;
pub mod data_manager;
pub mod operations;
pub mod rest;

pub use admin::ServerConfigurationClient;
pub use data_manager::DatabaseManagerClient;
pub use operations::{
    PlatformHealth, PlatformServicesClient, ServerOperationsClient, ServerStatusReport,
};
pub use rest::RestClient;
