//! Test database utilities
//!
//! Each test gets an isolated in-memory SQLite database with migrations applied.

use multicloud_dashboard::config::{DatabaseConfig, StorageConfig};
use multicloud_dashboard::storage::StorageLayer;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<StorageLayer>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let storage = StorageLayer::new(&test_storage_config())
            .await
            .expect("Failed to create in-memory test database");

        Self {
            inner: Arc::new(storage),
        }
    }

    pub fn storage(&self) -> Arc<StorageLayer> {
        Arc::clone(&self.inner)
    }
}

/// In-memory SQLite only supports one connection
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    }
}

pub fn test_storage_config() -> StorageConfig {
    StorageConfig {
        database: test_db_config(),
    }
}
