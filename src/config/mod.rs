//! Configuration management for the dashboard
//!
//! Loads the YAML file, applies environment overrides and validates every section.

pub mod models;

pub use models::*;

use crate::utils::error::{DashboardError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Main configuration struct for the dashboard
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DashboardError::Config(format!("Failed to read config file: {}", e)))?;

        let dashboard: DashboardConfig = serde_yaml::from_str(&content)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { dashboard };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load the file if present, then apply process environment overrides
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok()).await
    }

    pub async fn load_with_env<P, F>(path: P, env: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::from_file(path).await?
        } else {
            warn!(
                "Configuration file {:?} not found, using defaults and environment",
                path
            );
            Self::default()
        };

        config
            .dashboard
            .apply_env(env)
            .map_err(|e| DashboardError::Config(format!("Environment override error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn server(&self) -> &ServerConfig {
        &self.dashboard.server
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.dashboard.auth
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.dashboard.storage
    }

    pub fn cloud(&self) -> &CloudConfig {
        &self.dashboard.cloud
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.dashboard.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.dashboard
            .server
            .validate()
            .map_err(|e| DashboardError::Config(format!("Server config error: {}", e)))?;

        self.dashboard
            .auth
            .validate()
            .map_err(|e| DashboardError::Config(format!("Auth config error: {}", e)))?;

        self.dashboard
            .storage
            .database
            .validate()
            .map_err(|e| DashboardError::Config(format!("Storage config error: {}", e)))?;

        self.dashboard
            .cloud
            .validate()
            .map_err(|e| DashboardError::Config(format!("Cloud config error: {}", e)))?;

        self.dashboard
            .logging
            .validate()
            .map_err(|e| DashboardError::Config(format!("Logging config error: {}", e)))?;

        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.dashboard)
            .map_err(|e| DashboardError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
