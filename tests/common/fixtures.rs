//! Configuration fixtures

use multicloud_dashboard::config::{Config, DashboardConfig};
use std::collections::HashMap;

use super::database::test_storage_config;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Environment lookup backed by a fixed table
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

/// Mock-mode configuration on an in-memory database with reset tokens exposed
pub fn mock_config() -> Config {
    let mut dashboard = DashboardConfig::default();
    dashboard.storage = test_storage_config();
    dashboard.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    dashboard.auth.expose_reset_token = true;
    dashboard.cloud.use_mock_data = true;
    dashboard.cloud.accounts_file = "does/not/exist/clouds.json".to_string();
    Config { dashboard }
}
