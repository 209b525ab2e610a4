//! Server configuration

use super::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads
    pub workers: Option<usize>,
    /// Development mode, exposes password reset tokens in responses
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            dev_mode: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the number of workers (defaults to CPU count)
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.workers == Some(0) {
            return Err("Worker count cannot be 0".to_string());
        }
        self.cors.validate()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins (empty or `*` means allow all)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,
    /// Max age for preflight requests
    #[serde(default = "default_cors_max_age")]
    pub max_age: u32,
    #[serde(default)]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![],
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            max_age: default_cors_max_age(),
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    pub fn allows_all_origins(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Replace origins from a comma-separated list
    pub fn set_origins(&mut self, origins: &str) {
        self.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.allows_all_origins() && self.allow_credentials {
                return Err("CORS cannot allow all origins (*) when credentials are enabled".to_string());
            }

            if self.allows_all_origins() {
                warn!("CORS allows all origins. This may be insecure for production.");
            }
        }
        Ok(())
    }
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "OPTIONS"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    ["authorization", "content-type"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_cors_max_age() -> u32 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_origins_splits_and_trims() {
        let mut cors = CorsConfig::default();
        cors.set_origins("http://localhost:3000, https://dash.example.com,");
        assert_eq!(
            cors.allowed_origins,
            ["http://localhost:3000", "https://dash.example.com"]
        );
        assert!(!cors.allows_all_origins());

        cors.set_origins("*");
        assert!(cors.allows_all_origins());
    }

    #[test]
    fn test_credentials_with_wildcard_rejected() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(cors.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let server = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(server.validate().is_err());
        assert_eq!(ServerConfig::default().address(), "0.0.0.0:5050");
    }
}
