//! GCP project settings

use serde::{Deserialize, Serialize};

use crate::core::providers::AdapterConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    #[serde(default)]
    pub project_id: String,
    /// BigQuery billing export table, `project.dataset.table`
    #[serde(default)]
    pub billing_table: Option<String>,
    /// Service account key file
    #[serde(default)]
    pub credentials_file: Option<String>,
    /// Pre-issued OAuth token
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_bigquery_endpoint")]
    pub bigquery_endpoint: String,
    #[serde(default = "default_monitoring_endpoint")]
    pub monitoring_endpoint: String,
    /// Overrides the key file's `token_uri`
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

fn default_bigquery_endpoint() -> String {
    "https://bigquery.googleapis.com".to_string()
}

fn default_monitoring_endpoint() -> String {
    "https://monitoring.googleapis.com".to_string()
}

fn default_metadata_endpoint() -> String {
    "http://metadata.google.internal".to_string()
}

impl GcpConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            billing_table: None,
            credentials_file: None,
            access_token: None,
            bigquery_endpoint: default_bigquery_endpoint(),
            monitoring_endpoint: default_monitoring_endpoint(),
            token_endpoint: None,
            metadata_endpoint: default_metadata_endpoint(),
        }
    }

    pub fn with_billing_table(mut self, table: impl Into<String>) -> Self {
        self.billing_table = Some(table.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Point every Google endpoint at one base URL
    pub fn with_base_endpoint(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.bigquery_endpoint = base.clone();
        self.monitoring_endpoint = base.clone();
        self.metadata_endpoint = base;
        self
    }
}

/// Table references are interpolated into SQL, so only identifier characters pass
fn is_valid_table_ref(table: &str) -> bool {
    !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

impl AdapterConfig for GcpConfig {
    const PROVIDER: &'static str = "gcp";

    fn validate(&self) -> Result<(), String> {
        if self.project_id.trim().is_empty() {
            return Err("GCP project_id required".to_string());
        }
        if let Some(table) = &self.billing_table {
            if !is_valid_table_ref(table) {
                return Err(format!("Invalid GCP billing_table: {}", table));
            }
        }
        for endpoint in [
            &self.bigquery_endpoint,
            &self.monitoring_endpoint,
            &self.metadata_endpoint,
        ] {
            url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid GCP endpoint {}: {}", endpoint, e))?;
        }
        Ok(())
    }
}
