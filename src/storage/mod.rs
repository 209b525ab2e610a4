//! Storage layer for the dashboard
//!
//! Users and password reset tokens, persisted with SeaORM.

/// Database storage module
pub mod database;

use crate::config::StorageConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// Handle to every storage backend
#[derive(Debug, Clone)]
pub struct StorageLayer {
    pub database: Arc<database::Database>,
}

impl StorageLayer {
    /// Connect and bring the schema up to date
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");
        let database = database::Database::new(&config.database).await?;
        database.migrate().await?;
        Ok(Self {
            database: Arc::new(database),
        })
    }

    pub fn db(&self) -> &database::Database {
        &self.database
    }

    pub async fn health_check(&self) -> Result<()> {
        self.database.health_check().await
    }
}
