//! Azure AD token acquisition
//!
//! Supports:
//! - a pre-issued access token
//! - the client-credentials flow for a service principal
//! - the Azure CLI (`az account get-access-token`)

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use super::AzureConfig;
use crate::core::providers::shared::{AccessToken, TokenCache, TokenResponse};

const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

#[derive(Debug, Clone)]
pub enum AzureCredentials {
    AccessToken(String),
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    Cli,
}

impl AzureCredentials {
    /// Explicit token first, then a complete service principal, then the CLI
    pub fn from_config(config: &AzureConfig) -> Self {
        if let Some(token) = &config.access_token {
            return Self::AccessToken(token.clone());
        }
        if !config.use_cli_auth {
            if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
                &config.tenant_id,
                &config.client_id,
                &config.client_secret,
            ) {
                return Self::ClientSecret {
                    tenant_id: tenant_id.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                };
            }
        }
        Self::Cli
    }
}

#[derive(Debug, Clone)]
pub struct AzureAuth {
    credentials: AzureCredentials,
    login_endpoint: String,
    tokens: TokenCache,
    http_client: reqwest::Client,
}

impl AzureAuth {
    pub fn new(config: &AzureConfig, http_client: reqwest::Client, tokens: TokenCache) -> Self {
        Self {
            credentials: AzureCredentials::from_config(config),
            login_endpoint: config.login_endpoint.trim_end_matches('/').to_string(),
            tokens,
            http_client,
        }
    }

    /// Get a valid access token
    pub async fn get_access_token(&self) -> Result<String> {
        let key = match &self.credentials {
            AzureCredentials::AccessToken(token) => return Ok(token.clone()),
            AzureCredentials::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => format!("azure:{}:{}:{}", self.login_endpoint, tenant_id, client_id),
            AzureCredentials::Cli => "azure:cli".to_string(),
        };
        if let Some(token) = self.tokens.get(&key).await {
            return Ok(token);
        }

        let new_token = match &self.credentials {
            AzureCredentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                self.client_secret_token(tenant_id, client_id, client_secret)
                    .await?
            }
            AzureCredentials::Cli => cli_token().await?,
            AzureCredentials::AccessToken(token) => return Ok(token.clone()),
        };

        let token_string = new_token.token.clone();
        self.tokens.insert(key, new_token).await;
        Ok(token_string)
    }

    async fn client_secret_token(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken> {
        debug!(tenant_id, client_id, "Requesting Azure token with client credentials");
        let url = format!("{}/{}/oauth2/v2.0/token", self.login_endpoint, tenant_id);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", MANAGEMENT_SCOPE),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Azure token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Azure token endpoint returned {}: {}", status, body);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Invalid Azure token response")?;
        Ok(AccessToken::expiring_in(token.access_token, token.expires_in))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Epoch seconds, present in recent CLI versions
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

async fn cli_token() -> Result<AccessToken> {
    debug!("Requesting Azure token from the az CLI");
    let output = tokio::process::Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            MANAGEMENT_RESOURCE,
            "--output",
            "json",
        ])
        .output()
        .await
        .context("Failed to run the az CLI")?;

    if !output.status.success() {
        bail!(
            "az account get-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_cli_token(&output.stdout)
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken> {
    let token: CliToken =
        serde_json::from_slice(stdout).context("Invalid az CLI token output")?;
    let lifetime = token
        .expires_on
        .map(|epoch| epoch - chrono::Utc::now().timestamp())
        .unwrap_or(30 * 60);
    Ok(AccessToken::expiring_in(token.access_token, lifetime))
}
