//! Directory of configured cloud accounts
//!
//! Accounts come from three sources, applied in order: environment detection, the JSON
//! accounts file, then `cloud.accounts` in the YAML config. A later source merges its keys
//! over an earlier one; `"enabled": false` removes the account.

use crate::config::{CloudAccountConfig, CloudConfig};
use crate::core::aggregation::{ActiveProvider, ProviderDirectory};
use crate::core::providers::ProviderSettings;
use crate::utils::error::{DashboardError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variables that imply an account, keyed by provider id
const ENV_ACCOUNTS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "aws",
        "AWS_ACCOUNT_ID",
        &[("use_profile", "AWS_PROFILE"), ("region", "AWS_REGION")],
    ),
    (
        "azure",
        "AZURE_SUBSCRIPTION_ID",
        &[
            ("tenant_id", "AZURE_TENANT_ID"),
            ("client_id", "AZURE_CLIENT_ID"),
            ("client_secret", "AZURE_CLIENT_SECRET"),
        ],
    ),
    (
        "gcp",
        "GCP_PROJECT_ID",
        &[
            ("billing_table", "GCP_BILLING_TABLE"),
            ("credentials_file", "GOOGLE_APPLICATION_CREDENTIALS"),
        ],
    ),
];

/// Setting that names each provider's primary identifier
fn primary_key(provider: &str) -> &'static str {
    match provider {
        "aws" => "account_id",
        "azure" => "subscription_id",
        _ => "project_id",
    }
}

#[derive(Debug, Clone, Default)]
pub struct CloudAccountManager {
    accounts: BTreeMap<String, ProviderSettings>,
}

impl CloudAccountManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every source for `config`, reading variables through `env`
    pub async fn load<F>(config: &CloudConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut manager = Self::from_env(env);
        manager
            .apply_accounts_file(Path::new(&config.accounts_file))
            .await?;
        manager.apply_config_accounts(&config.accounts);

        info!(
            accounts = manager.accounts.len(),
            ids = ?manager.ids(),
            "Cloud accounts loaded"
        );
        Ok(manager)
    }

    /// Accounts implied by environment variables alone
    pub fn from_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut manager = Self::new();
        for (provider, required, optional) in ENV_ACCOUNTS {
            let Some(id) = env(required).filter(|v| !v.trim().is_empty()) else {
                continue;
            };

            let mut settings = ProviderSettings::new().with(primary_key(provider), id);
            for (key, var) in optional.iter() {
                if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
                    settings.insert(*key, value);
                }
            }
            debug!(provider = %provider, "Detected account from environment");
            manager.insert(provider, settings);
        }
        manager
    }

    pub fn with_account(mut self, id: &str, settings: ProviderSettings) -> Self {
        self.insert(id, settings);
        self
    }

    /// Merge `settings` into the account `id` (case-insensitive)
    pub fn insert(&mut self, id: &str, settings: ProviderSettings) {
        self.accounts
            .entry(id.to_lowercase())
            .or_default()
            .extend(settings);
    }

    pub fn remove(&mut self, id: &str) -> Option<ProviderSettings> {
        self.accounts.remove(&id.to_lowercase())
    }

    /// Configured ids in listing order
    pub fn ids(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Apply the JSON accounts file; a missing file is skipped
    pub async fn apply_accounts_file(&mut self, path: &Path) -> Result<()> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No accounts file");
                return Ok(());
            }
            Err(e) => return Err(DashboardError::Io(e)),
        };

        self.apply_accounts_json(&contents).map_err(|e| {
            DashboardError::config(format!(
                "Invalid accounts file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply a JSON object mapping provider id to a settings object
    pub fn apply_accounts_json(&mut self, contents: &str) -> std::result::Result<(), String> {
        let root: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        let Value::Object(entries) = root else {
            return Err("expected an object of provider settings".to_string());
        };

        for (id, value) in entries {
            let Value::Object(map) = value else {
                return Err(format!("settings for '{}' must be an object", id));
            };
            let mut settings = ProviderSettings::from(map);
            let enabled = settings
                .remove("enabled")
                .map(|v| v.as_bool().unwrap_or(true))
                .unwrap_or(true);

            if enabled {
                self.insert(&id, settings);
            } else if self.remove(&id).is_some() {
                warn!(provider = %id, "Account disabled by accounts file");
            }
        }
        Ok(())
    }

    pub fn apply_config_accounts(&mut self, accounts: &[CloudAccountConfig]) {
        for account in accounts {
            if account.enabled {
                self.insert(&account.name, account.settings.clone());
            } else {
                self.remove(&account.name);
            }
        }
    }
}

impl ProviderDirectory for CloudAccountManager {
    fn is_provider_configured(&self, id: &str) -> bool {
        self.accounts.contains_key(&id.to_lowercase())
    }

    fn config(&self, id: &str) -> Option<ProviderSettings> {
        self.accounts.get(&id.to_lowercase()).cloned()
    }

    fn active_providers(&self) -> Vec<ActiveProvider> {
        self.accounts.keys().map(ActiveProvider::configured).collect()
    }
}
