//! Synthetic provider
//!
//! Serves realistic-looking random data with the same shapes as the live adapters.
//! Used for `mock*` provider ids and for every id when mock mode is on.

pub mod data;

use async_trait::async_trait;
use chrono::Utc;

use super::{CloudProvider, ProviderResult};
use crate::core::types::{
    Alert, Anomaly, Budget, CostLineItem, DailyCostPoint, Forecast, MetricSnapshot, Outcome,
    Recommendation, TimeseriesSeries,
};

#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
}

impl MockProvider {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn items(&self) -> Vec<CostLineItem> {
        data::month_to_date_items(&mut rand::thread_rng())
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
        Outcome::Data(self.items())
    }

    async fn daily_costs(&self, days: u32) -> Outcome<Vec<DailyCostPoint>> {
        data::daily_costs(&mut rand::thread_rng(), days, Utc::now().date_naive()).into()
    }

    async fn live_metrics(&self) -> MetricSnapshot {
        data::live_metrics(&mut rand::thread_rng())
    }

    async fn timeseries(&self, metric: &str, minutes: u32) -> TimeseriesSeries {
        let points = data::timeseries_points(&mut rand::thread_rng(), metric, minutes, Utc::now());
        TimeseriesSeries::from_points(metric, points)
    }

    async fn anomalies(&self) -> ProviderResult<Vec<Anomaly>> {
        let items = self.items();
        Ok(data::anomalies(
            &mut rand::thread_rng(),
            &self.name,
            &items,
            Utc::now(),
        ))
    }

    async fn forecast(&self, days: u32) -> ProviderResult<Forecast> {
        let total: f64 = self.items().iter().map(|item| item.cost).sum();
        data::forecast(
            &mut rand::thread_rng(),
            total,
            days,
            Utc::now().date_naive(),
        )
    }

    async fn recommendations(&self) -> ProviderResult<Vec<Recommendation>> {
        Ok(data::recommendations(
            &mut rand::thread_rng(),
            &self.name,
            Utc::now(),
        ))
    }

    async fn alerts(&self) -> ProviderResult<Vec<Alert>> {
        let now = Utc::now();
        let items = self.items();
        let anomalies = data::anomalies(&mut rand::thread_rng(), &self.name, &items, now);
        let budgets = data::budgets(&self.name, &items, now.date_naive());
        Ok(data::alerts(&anomalies, &budgets, now))
    }

    async fn budgets(&self) -> ProviderResult<Vec<Budget>> {
        Ok(data::budgets(
            &self.name,
            &self.items(),
            Utc::now().date_naive(),
        ))
    }
}
