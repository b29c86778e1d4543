//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{BlobName, StoredBlob};
use crate::config::RewardsConfig;
use crate::error::RewardsError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized from the configuration and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`RewardsError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &RewardsConfig) -> Result<Self, RewardsError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RewardsError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Writes a blob, replacing any previous one with the same name.
    ///
    /// # Errors
    ///
    /// Returns a [`RewardsError::PersistenceError`] on database failure.
    pub async fn save_blob(&self, blob: &StoredBlob) -> Result<(), RewardsError> {
        sqlx::query(
            "INSERT INTO store_blobs (name, schema_version, payload, saved_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO UPDATE SET \
             schema_version = EXCLUDED.schema_version, \
             payload = EXCLUDED.payload, \
             saved_at = EXCLUDED.saved_at",
        )
        .bind(&blob.name)
        .bind(blob.schema_version)
        .bind(&blob.payload)
        .bind(blob.saved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads a blob by name.
    ///
    /// # Errors
    ///
    /// Returns a [`RewardsError::PersistenceError`] on database failure.
    pub async fn load_blob(&self, name: BlobName) -> Result<Option<StoredBlob>, RewardsError> {
        let row = sqlx::query_as::<_, (String, i32, serde_json::Value, DateTime<Utc>)>(
            "SELECT name, schema_version, payload, saved_at FROM store_blobs WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, schema_version, payload, saved_at)| StoredBlob {
            name,
            schema_version,
            payload,
            saved_at,
        }))
    }
}
