//! GCP authentication
//!
//! Supports:
//! - Service account JSON key files
//! - Application Default Credentials via the metadata server
//! - Access Token

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::GcpConfig;
use crate::core::providers::shared::{AccessToken, TokenCache, TokenResponse};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

#[derive(Debug, Clone)]
pub enum GcpCredentials {
    /// Service account key, read on first use
    ServiceAccountFile(PathBuf),
    /// Metadata server of the hosting GCE / Cloud Run instance
    MetadataServer,
    AccessToken(String),
}

impl GcpCredentials {
    pub fn from_config(config: &GcpConfig) -> Self {
        if let Some(token) = &config.access_token {
            Self::AccessToken(token.clone())
        } else if let Some(path) = &config.credentials_file {
            Self::ServiceAccountFile(PathBuf::from(path))
        } else {
            Self::MetadataServer
        }
    }
}

/// Service Account key structure
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Clone)]
pub struct GcpAuth {
    credentials: GcpCredentials,
    token_endpoint: Option<String>,
    metadata_endpoint: String,
    tokens: TokenCache,
    http_client: reqwest::Client,
}

impl GcpAuth {
    pub fn new(config: &GcpConfig, http_client: reqwest::Client, tokens: TokenCache) -> Self {
        Self {
            credentials: GcpCredentials::from_config(config),
            token_endpoint: config.token_endpoint.clone(),
            metadata_endpoint: config.metadata_endpoint.trim_end_matches('/').to_string(),
            tokens,
            http_client,
        }
    }

    /// Parse a service account key file's contents
    pub fn parse_service_account(json: &str) -> Result<ServiceAccountKey> {
        let key: ServiceAccountKey =
            serde_json::from_str(json).context("Invalid service account key")?;
        if key.key_type != "service_account" {
            bail!("Unsupported credential type: {}", key.key_type);
        }
        Ok(key)
    }

    /// Get a valid access token
    pub async fn get_access_token(&self) -> Result<String> {
        let key = match &self.credentials {
            GcpCredentials::AccessToken(token) => return Ok(token.clone()),
            GcpCredentials::ServiceAccountFile(path) => format!("gcp:key:{}", path.display()),
            GcpCredentials::MetadataServer => format!("gcp:metadata:{}", self.metadata_endpoint),
        };
        if let Some(token) = self.tokens.get(&key).await {
            return Ok(token);
        }

        let new_token = match &self.credentials {
            GcpCredentials::AccessToken(token) => return Ok(token.clone()),
            GcpCredentials::ServiceAccountFile(path) => {
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read credentials file {:?}", path))?;
                let key = Self::parse_service_account(&contents)?;
                self.service_account_token(&key).await?
            }
            GcpCredentials::MetadataServer => self.metadata_token().await?,
        };

        let token_string = new_token.token.clone();
        self.tokens.insert(key, new_token).await;
        Ok(token_string)
    }

    /// Exchange a self-signed RS256 assertion for an access token
    async fn service_account_token(&self, key: &ServiceAccountKey) -> Result<AccessToken> {
        use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

        #[derive(Debug, Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            exp: i64,
            iat: i64,
        }

        let token_uri = self.token_endpoint.as_deref().unwrap_or(&key.token_uri);
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &key.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Invalid service account private key")?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        debug!(client_email = %key.client_email, "Exchanging service account assertion");
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];
        let response = self
            .http_client
            .post(token_uri)
            .form(&params)
            .send()
            .await
            .context("GCP token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("GCP token endpoint returned {}: {}", status, body);
        }

        let token: TokenResponse = response.json().await.context("Invalid GCP token response")?;
        Ok(AccessToken::expiring_in(token.access_token, token.expires_in))
    }

    async fn metadata_token(&self) -> Result<AccessToken> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.metadata_endpoint
        );
        let response = self
            .http_client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("Unable to reach the GCP metadata server; set credentials_file or GOOGLE_APPLICATION_CREDENTIALS")?;

        if !response.status().is_success() {
            bail!("GCP metadata server returned {}", response.status());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Invalid metadata token response")?;
        Ok(AccessToken::expiring_in(token.access_token, token.expires_in))
    }
}
