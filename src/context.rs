//! Application context holding the shared stores and configuration.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::migration::{LogDestination, MigrationEngine};
use crate::store::backends::postgres::{PostgresLegacyStore, PostgresRecordStore};

/// Engine wired to the PostgreSQL stores.
pub type AppEngine = MigrationEngine<PostgresLegacyStore, PostgresRecordStore>;

/// Root application context.
#[derive(Clone)]
pub struct Context {
    /// Store being retired.
    pub legacy: Arc<PostgresLegacyStore>,
    /// Store receiving migrated records.
    pub target: Arc<PostgresRecordStore>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates connection pools for both stores.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        tracing::info!("Connecting to legacy store at {}", config.legacy.uri);
        let legacy = PostgresLegacyStore::connect(&config.legacy.uri).await?;

        tracing::info!("Connecting to target store at {}", config.target.uri);
        let target = PostgresRecordStore::connect(&config.target.uri).await?;

        Ok(Self {
            legacy: Arc::new(legacy),
            target: Arc::new(target),
            config: Arc::new(config),
        })
    }

    /// Builds a migration engine writing its log to `destination`.
    pub fn engine(&self, destination: LogDestination) -> AppEngine {
        MigrationEngine::new(self.legacy.clone(), self.target.clone(), destination)
    }
}
