//! Top-level dashboard configuration

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DashboardConfig {
    /// Apply environment overrides on top of file values
    pub fn apply_env<F>(&mut self, env: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("USE_MOCK_DATA") {
            self.cloud.use_mock_data = parse_env_flag(&value);
        }
        if let Some(secret) = env("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(hours) = env("JWT_TTL_HOURS") {
            let hours: u64 = hours
                .trim()
                .parse()
                .map_err(|_| format!("Invalid JWT_TTL_HOURS: {hours}"))?;
            self.auth.jwt_expiration = hours * 3600;
        }
        if let Some(url) = env("DATABASE_URL") {
            self.storage.database.url = url;
        }
        if let Some(path) = env("CLOUD_CONFIG_PATH") {
            self.cloud.accounts_file = path;
        }
        if let Some(origins) = env("CORS_ORIGINS") {
            self.server.cors.set_origins(&origins);
        }
        if let Some(host) = env("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| format!("Invalid PORT: {port}"))?;
        }
        Ok(())
    }
}
