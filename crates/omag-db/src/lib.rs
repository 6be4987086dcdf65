pub mod config;
pub mod connector;
pub mod database;
pub mod repository;

pub use config::DatabaseConfig;
pub use connector::PlatformConnectorFactory;
pub use database::Database;
pub use repository::PgMetadataCollection;
