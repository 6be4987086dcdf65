use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use omag_core::OmagError;
use omag_core::admin::config::{LocalRepositoryConfig, LocalRepositoryMode};
use omag_core::operations::{InMemoryConnectorFactory, RepositoryConnectorFactory};
use omag_core::repository::MetadataCollection;
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::database::Database;

/// Opens in-memory and PostgreSQL repositories.
///
/// PostgreSQL pools are shared by every server using the same connection URL, and are
/// migrated the first time they are opened.
#[derive(Default)]
pub struct PlatformConnectorFactory {
    databases: Mutex<HashMap<String, Database>>,
}

impl PlatformConnectorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    async fn database(&self, connection_url: &str) -> Result<Database, OmagError> {
        let mut databases = self.databases.lock().await;
        if let Some(database) = databases.get(connection_url) {
            return Ok(database.clone());
        }
        let database = Database::connect(&DatabaseConfig::from_env(connection_url)?).await?;
        database.migrate().await?;
        databases.insert(connection_url.to_string(), database.clone());
        Ok(database)
    }
}

#[async_trait]
impl RepositoryConnectorFactory for PlatformConnectorFactory {
    async fn connect(
        &self,
        server_name: &str,
        config: &LocalRepositoryConfig,
    ) -> Result<Arc<dyn MetadataCollection>, OmagError> {
        match &config.mode {
            LocalRepositoryMode::InMemory => {
                InMemoryConnectorFactory.connect(server_name, config).await
            }
            LocalRepositoryMode::Postgres { connection_url } => {
                let database = self.database(connection_url).await?;
                tracing::info!(
                    server = %server_name,
                    collection = %config.metadata_collection_id,
                    "Connected PostgreSQL metadata repository"
                );
                Ok(Arc::new(
                    database.metadata_collection(config.metadata_collection_id),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_repositories_are_fresh() {
        let factory = PlatformConnectorFactory::new();
        let config = LocalRepositoryConfig::new(LocalRepositoryMode::InMemory);
        let repository = factory.connect("cocoMDS1", &config).await.unwrap();
        repository.health_check().await.unwrap();
        assert!(factory.databases.lock().await.is_empty());
    }
}
