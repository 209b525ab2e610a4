//! Google Cloud adapter
//!
//! Costs come from the BigQuery billing export, metrics from Cloud Monitoring.

pub mod auth;
pub mod config;
pub mod provider;

pub use auth::{GcpAuth, GcpCredentials};
pub use config::GcpConfig;
pub use provider::GcpProvider;

use super::shared::TokenCache;
use super::{CloudProvider, ProviderResult, ProviderSettings};

/// Constructor for the factory; every adapter it builds shares `tokens`
pub fn constructor(
    tokens: TokenCache,
) -> impl Fn(&ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> + Send + Sync + 'static {
    move |settings: &ProviderSettings| {
        let config: GcpConfig = settings.parse()?;
        Ok(Box::new(GcpProvider::new(config, tokens.clone())?) as Box<dyn CloudProvider>)
    }
}
