//! Cross-provider result shapes

use super::insights::{Alert, Anomaly, Budget, Forecast, Recommendation, ServicesBreakdown};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A per-provider record with the source provider injected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagged<T> {
    pub provider: String,
    #[serde(flatten)]
    pub item: T,
}

impl<T> Tagged<T> {
    pub fn new(provider: impl Into<String>, item: T) -> Self {
        Self {
            provider: provider.into(),
            item,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Active,
    Error,
}

/// One line of the cross-provider cost summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCostSummary {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: ProviderStatus,
}

impl ProviderCostSummary {
    pub fn active(provider: impl Into<String>, mtd_cost: f64) -> Self {
        Self {
            provider: provider.into(),
            mtd_cost: Some(mtd_cost),
            error: None,
            status: ProviderStatus::Active,
        }
    }

    pub fn failed(provider: impl Into<String>, error: impl ToString) -> Self {
        Self {
            provider: provider.into(),
            mtd_cost: None,
            error: Some(error.to_string()),
            status: ProviderStatus::Error,
        }
    }
}

/// Keyed per-provider value: data, or an explicit error entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderEntry<T> {
    Data(T),
    Failed { error: String },
}

/// Provider-keyed map that keeps active-provider order on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMap<T> {
    entries: Vec<(String, ProviderEntry<T>)>,
}

impl<T> ProviderMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, provider: impl Into<String>, entry: ProviderEntry<T>) {
        let provider = provider.into();
        match self.entries.iter_mut().find(|(name, _)| *name == provider) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((provider, entry)),
        }
    }

    pub fn get(&self, provider: &str) -> Option<&ProviderEntry<T>> {
        self.entries
            .iter()
            .find(|(name, _)| name == provider)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderEntry<T>)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl<T> Default for ProviderMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for ProviderMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub providers: ProviderMap<Forecast>,
    pub total_current_mtd: f64,
    pub total_projected_eom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicesSummary {
    pub providers: ProviderMap<ServicesBreakdown>,
    pub total_cost: f64,
    pub total_services: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub recommendations: Vec<Tagged<Recommendation>>,
    pub total_potential_savings_monthly: f64,
    pub total_potential_savings_yearly: f64,
    pub recommendation_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub warning: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub alerts: Vec<Tagged<Alert>>,
    pub total_count: usize,
    pub unacknowledged_count: usize,
    pub severity_counts: SeverityCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub budgets: Vec<Tagged<Budget>>,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub overall_utilization: f64,
    pub at_risk_count: usize,
}

pub type TaggedAnomalies = Vec<Tagged<Anomaly>>;
