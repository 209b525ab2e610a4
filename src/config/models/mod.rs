//! Configuration data models
//!
//! This module defines all configuration structures used by the dashboard.

#![allow(missing_docs)]

pub mod auth;
pub mod cloud;
pub mod dashboard;
pub mod logging;
pub mod server;
pub mod storage;

pub use auth::*;
pub use cloud::*;
pub use dashboard::*;
pub use logging::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    5050
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_database_url() -> String {
    "sqlite://data/dashboard.db?mode=rwc".to_string()
}

/// Eight hours
pub fn default_jwt_expiration() -> u64 {
    8 * 3600
}

/// Thirty minutes
pub fn default_reset_token_ttl() -> u64 {
    30 * 60
}

pub fn default_accounts_file() -> String {
    "config/clouds.json".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

/// Parse a boolean-ish environment value (`1`, `true`, `yes`, `on`)
pub fn parse_env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
