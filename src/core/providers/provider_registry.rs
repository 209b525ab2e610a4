//! Provider factory
//!
//! Maps provider ids to adapter constructors. In mock mode every id resolves to
//! the synthetic adapter.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::mock::MockProvider;
use super::shared::TokenCache;
use super::{CloudProvider, ProviderError, ProviderResult, ProviderSettings};

/// Builds an adapter from its settings
pub type ProviderConstructor =
    Arc<dyn Fn(&ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> + Send + Sync>;

/// `mock*` ids are always named after themselves
fn mock_constructor(
    name: &'static str,
) -> impl Fn(&ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> + Send + Sync + 'static {
    move |_settings: &ProviderSettings| {
        Ok(Box::new(MockProvider::named(name)) as Box<dyn CloudProvider>)
    }
}

#[derive(Clone)]
pub struct ProviderFactory {
    constructors: HashMap<String, ProviderConstructor>,
    use_mock_data: bool,
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("registered", &self.registered())
            .field("use_mock_data", &self.use_mock_data)
            .finish()
    }
}

impl ProviderFactory {
    /// Factory with the built-in adapters registered
    ///
    /// Azure and GCP adapters built by one factory share a token cache, so a
    /// fresh adapter per request still reuses unexpired access tokens.
    pub fn new(use_mock_data: bool) -> Self {
        let mut factory = Self::empty(use_mock_data);
        let tokens = TokenCache::new();
        factory.register("aws", super::aws::create);
        factory.register("azure", super::azure::constructor(tokens.clone()));
        factory.register("gcp", super::gcp::constructor(tokens));
        factory.register("mock", mock_constructor("mock"));
        factory.register("mock_aws", mock_constructor("mock_aws"));
        factory.register("mock_azure", mock_constructor("mock_azure"));
        factory.register("mock_gcp", mock_constructor("mock_gcp"));
        factory
    }

    /// Factory with nothing registered
    pub fn empty(use_mock_data: bool) -> Self {
        Self {
            constructors: HashMap::new(),
            use_mock_data,
        }
    }

    /// Register or replace a constructor; the id is lower-cased
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.to_lowercase(), Arc::new(constructor));
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock_data
    }

    /// Registered ids, sorted
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct the adapter for `id` (case-insensitive)
    pub fn create(
        &self,
        id: &str,
        settings: &ProviderSettings,
    ) -> ProviderResult<Box<dyn CloudProvider>> {
        let key = id.to_lowercase();

        if self.use_mock_data {
            debug!(provider = %key, "Mock mode, constructing synthetic provider");
            return Ok(Box::new(MockProvider::named(key)));
        }

        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| ProviderError::unsupported_provider(id))?;
        debug!(provider = %key, "Constructing provider");
        constructor(settings)
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new(false)
    }
}
