use omag_core::OmagError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::repository::PgMetadataCollection;

/// Owns the connection pool, runs migrations and vends metadata collections.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, OmagError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| OmagError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), OmagError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OmagError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// The repository of one server, identified by its metadata collection id.
    pub fn metadata_collection(&self, collection_id: Uuid) -> PgMetadataCollection {
        PgMetadataCollection::new(self.pool.clone(), collection_id)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
