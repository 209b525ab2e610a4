//! Microsoft Azure adapter
//!
//! Costs come from the Cost Management query API. Live metrics and timeseries
//! are not offered yet and return placeholders.

pub mod auth;
pub mod config;
pub mod provider;

pub use auth::{AzureAuth, AzureCredentials};
pub use config::AzureConfig;
pub use provider::AzureProvider;

use super::shared::TokenCache;
use super::{CloudProvider, ProviderResult, ProviderSettings};

/// Constructor for the factory; every adapter it builds shares `tokens`
pub fn constructor(
    tokens: TokenCache,
) -> impl Fn(&ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> + Send + Sync + 'static {
    move |settings: &ProviderSettings| {
        let config: AzureConfig = settings.parse()?;
        Ok(Box::new(AzureProvider::new(config, tokens.clone())?) as Box<dyn CloudProvider>)
    }
}
