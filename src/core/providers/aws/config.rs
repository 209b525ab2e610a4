//! AWS account settings

use serde::{Deserialize, Serialize};

use crate::core::providers::AdapterConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub account_id: String,
    /// Named profile from the shared credentials file
    #[serde(default)]
    pub use_profile: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl AdapterConfig for AwsConfig {
    const PROVIDER: &'static str = "aws";

    fn validate(&self) -> Result<(), String> {
        if self.account_id.trim().is_empty() {
            return Err("AWS account_id required".to_string());
        }
        if self.region.trim().is_empty() {
            return Err("AWS region cannot be empty".to_string());
        }
        Ok(())
    }
}
