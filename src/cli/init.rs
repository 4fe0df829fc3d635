//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::store::backends::postgres::PostgresRecordStore;

use super::App;

impl App {
    /// Run the init command to create the new store's tables.
    pub async fn run_init(&self) -> Result<()> {
        let config = Config::load()?;

        tracing::info!("Connecting to target store at {}", config.target.uri);
        let target = PostgresRecordStore::connect(&config.target.uri)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?;

        tracing::info!("Ensuring record and queue tables exist...");
        target
            .ensure_schema()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create tables: {}", e))?;

        tracing::info!("Target store ready");
        Ok(())
    }
}
