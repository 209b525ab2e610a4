//! Cloud account and aggregation configuration

use super::*;
use crate::core::providers::ProviderSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Serve deterministic-shape synthetic data instead of calling vendors
    #[serde(default)]
    pub use_mock_data: bool,
    /// JSON file mapping provider id to settings
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
    /// Inline accounts, applied after the accounts file
    #[serde(default)]
    pub accounts: Vec<CloudAccountConfig>,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            use_mock_data: false,
            accounts_file: default_accounts_file(),
            accounts: Vec::new(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl CloudConfig {
    pub fn validate(&self) -> Result<(), String> {
        for account in &self.accounts {
            if account.name.trim().is_empty() {
                return Err("Cloud account name cannot be empty".to_string());
            }
        }
        self.aggregation.validate()
    }
}

/// One configured cloud account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudAccountConfig {
    /// Provider id, e.g. `aws` or `mock_gcp`
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Adapter settings passed to the provider constructor
    #[serde(default)]
    pub settings: ProviderSettings,
}

/// Fan-out behaviour of the aggregation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Query providers concurrently instead of one after another
    #[serde(default)]
    pub concurrent: bool,
    /// Per-provider call limit; unset means no limit
    #[serde(default)]
    pub provider_timeout_secs: Option<u64>,
}

impl AggregationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.provider_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.provider_timeout_secs == Some(0) {
            return Err("provider_timeout_secs cannot be 0".to_string());
        }
        Ok(())
    }
}
