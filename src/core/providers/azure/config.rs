//! Azure subscription settings

use serde::{Deserialize, Serialize};

use crate::core::providers::AdapterConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub subscription_id: String,
    /// Take tokens from `az account get-access-token`
    #[serde(default)]
    pub use_cli_auth: bool,
    /// Pre-issued bearer token
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

fn default_login_endpoint() -> String {
    "https://login.microsoftonline.com".to_string()
}

impl AzureConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            use_cli_auth: false,
            access_token: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            management_endpoint: default_management_endpoint(),
            login_endpoint: default_login_endpoint(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.management_endpoint = endpoint.into();
        self
    }

    /// Cost Management query URL for this subscription
    pub fn query_url(&self, api_version: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.CostManagement/query?api-version={}",
            self.management_endpoint.trim_end_matches('/'),
            self.subscription_id,
            api_version
        )
    }
}

impl AdapterConfig for AzureConfig {
    const PROVIDER: &'static str = "azure";

    fn validate(&self) -> Result<(), String> {
        if self.subscription_id.trim().is_empty() {
            return Err("Azure subscription_id required".to_string());
        }
        for endpoint in [&self.management_endpoint, &self.login_endpoint] {
            url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid Azure endpoint {}: {}", endpoint, e))?;
        }
        Ok(())
    }
}
