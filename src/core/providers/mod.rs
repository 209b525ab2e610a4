//! Cloud provider adapters
//!
//! Every vendor is exposed through the [`CloudProvider`] trait. The five core
//! operations never fail: errors come back inline as data. The insight
//! operations have defaults and may fail with a [`ProviderError`].

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod mock;
pub mod provider_registry;
pub mod shared;
pub mod unified_provider;

pub use provider_registry::{ProviderConstructor, ProviderFactory};
pub use unified_provider::ProviderError;

use crate::core::types::{
    Alert, Anomaly, Budget, CostLineItem, DailyCostPoint, Forecast, MetricSnapshot, Outcome,
    Recommendation, ServicesBreakdown, TimeseriesSeries,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Uniform cost and metrics contract over one cloud account
#[async_trait]
pub trait CloudProvider: Send + Sync + std::fmt::Debug {
    /// Display name, e.g. `aws` or `mock_gcp`
    fn name(&self) -> &str;

    /// Current-month spend per service
    async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>>;

    /// Spend per day over the trailing `days`, oldest first
    async fn daily_costs(&self, days: u32) -> Outcome<Vec<DailyCostPoint>>;

    async fn live_metrics(&self) -> MetricSnapshot;

    /// Metric series over the trailing `minutes`
    async fn timeseries(&self, metric: &str, minutes: u32) -> TimeseriesSeries;

    /// Sum of month-to-date costs, 0 when the cost query failed
    async fn month_to_date_total(&self) -> f64 {
        match self.month_to_date_costs().await {
            Outcome::Data(items) => items.iter().map(|item| item.cost).sum(),
            Outcome::Failed(_) => 0.0,
        }
    }

    async fn anomalies(&self) -> ProviderResult<Vec<Anomaly>> {
        Ok(Vec::new())
    }

    async fn forecast(&self, _days: u32) -> ProviderResult<Forecast> {
        Ok(Forecast::empty(self.month_to_date_total().await))
    }

    async fn recommendations(&self) -> ProviderResult<Vec<Recommendation>> {
        Ok(Vec::new())
    }

    async fn alerts(&self) -> ProviderResult<Vec<Alert>> {
        Ok(Vec::new())
    }

    async fn budgets(&self) -> ProviderResult<Vec<Budget>> {
        Ok(Vec::new())
    }

    async fn services_breakdown(&self) -> ProviderResult<ServicesBreakdown> {
        Ok(match self.month_to_date_costs().await {
            Outcome::Data(items) => ServicesBreakdown::from_items(&items),
            Outcome::Failed(_) => ServicesBreakdown::empty(),
        })
    }
}

/// Typed adapter configuration parsed out of [`ProviderSettings`]
pub trait AdapterConfig: DeserializeOwned {
    const PROVIDER: &'static str;

    fn validate(&self) -> Result<(), String>;
}

/// Free-form per-provider settings (string keys, JSON values)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSettings(Map<String, Value>);

impl ProviderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every key of `other` over this map
    pub fn extend(&mut self, other: ProviderSettings) {
        self.0.extend(other.0);
    }

    /// Deserialize into an adapter config and validate it
    pub fn parse<C: AdapterConfig>(&self) -> ProviderResult<C> {
        let config: C = serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| {
            ProviderError::configuration(C::PROVIDER, format!("Invalid {} settings: {}", C::PROVIDER, e))
        })?;
        config
            .validate()
            .map_err(|message| ProviderError::configuration(C::PROVIDER, message))?;
        Ok(config)
    }
}

impl From<Map<String, Value>> for ProviderSettings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
