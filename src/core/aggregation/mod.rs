//! Aggregation layer
//!
//! Fans one logical request out to every active provider and merges the results.
//! List endpoints drop a failing provider; keyed endpoints record its error.

pub mod merge;

pub use merge::{merge_alerts, merge_anomalies, merge_budgets, merge_recommendations};

use crate::config::AggregationConfig;
use crate::core::providers::{
    CloudProvider, ProviderError, ProviderFactory, ProviderResult, ProviderSettings,
};
use crate::core::types::{
    AlertSummary, BudgetSummary, ForecastSummary, ProviderCostSummary, ProviderEntry, ProviderMap,
    RecommendationSummary, ServicesSummary, Tagged, TaggedAnomalies, round_to,
};
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A provider the directory reports as usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveProvider {
    pub name: String,
    pub status: String,
}

impl ActiveProvider {
    pub fn configured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "configured".to_string(),
        }
    }
}

/// Source of truth for which providers exist and how they are configured
#[cfg_attr(test, mockall::automock)]
pub trait ProviderDirectory: Send + Sync {
    fn is_provider_configured(&self, id: &str) -> bool;

    fn config(&self, id: &str) -> Option<ProviderSettings>;

    fn active_providers(&self) -> Vec<ActiveProvider>;
}

#[derive(Clone)]
pub struct Aggregator {
    factory: Arc<ProviderFactory>,
    directory: Arc<dyn ProviderDirectory>,
    settings: AggregationConfig,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("factory", &self.factory)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Aggregator {
    pub fn new(
        factory: Arc<ProviderFactory>,
        directory: Arc<dyn ProviderDirectory>,
        settings: AggregationConfig,
    ) -> Self {
        Self {
            factory,
            directory,
            settings,
        }
    }

    pub fn active_providers(&self) -> Vec<ActiveProvider> {
        self.directory.active_providers()
    }

    /// Adapter for a single-provider route
    pub fn provider_for(&self, id: &str) -> ProviderResult<Box<dyn CloudProvider>> {
        if !self.directory.is_provider_configured(id) {
            return Err(ProviderError::not_configured(id));
        }
        let settings = self.directory.config(id).unwrap_or_default();
        self.factory.create(id, &settings)
    }

    /// Month-to-date total per provider; construction failures become error rows
    pub async fn cost_summary(&self) -> Vec<ProviderCostSummary> {
        let results = self
            .fan_out("cost_summary", |provider| {
                Box::pin(async move { Ok(provider.month_to_date_total().await) })
            })
            .await;

        results
            .into_iter()
            .map(|(name, result)| match result {
                Ok(total) => ProviderCostSummary::active(name, round_to(total, 2)),
                Err(e) => {
                    warn!(provider = %name, error = %e, "Cost summary failed for provider");
                    ProviderCostSummary::failed(name, e)
                }
            })
            .collect()
    }

    pub async fn anomalies(&self) -> TaggedAnomalies {
        let results = self
            .fan_out("anomalies", |provider| provider.anomalies())
            .await;
        merge_anomalies(collect_tagged("anomalies", results))
    }

    pub async fn forecasts(&self, days: u32) -> ForecastSummary {
        let results = self
            .fan_out("forecast", move |provider| provider.forecast(days))
            .await;

        let mut providers = ProviderMap::new();
        let mut total_current_mtd = 0.0;
        let mut total_projected_eom = 0.0;
        for (name, result) in results {
            match result {
                Ok(forecast) => {
                    total_current_mtd += forecast.current_mtd;
                    total_projected_eom += forecast.projected_eom;
                    providers.insert(name, ProviderEntry::Data(forecast));
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "Forecast failed for provider");
                    providers.insert(name, ProviderEntry::Failed { error: e.to_string() });
                }
            }
        }

        ForecastSummary {
            providers,
            total_current_mtd: round_to(total_current_mtd, 2),
            total_projected_eom: round_to(total_projected_eom, 2),
        }
    }

    pub async fn recommendations(&self) -> RecommendationSummary {
        let results = self
            .fan_out("recommendations", |provider| provider.recommendations())
            .await;
        merge_recommendations(collect_tagged("recommendations", results))
    }

    pub async fn alerts(&self) -> AlertSummary {
        let results = self.fan_out("alerts", |provider| provider.alerts()).await;
        merge_alerts(collect_tagged("alerts", results))
    }

    pub async fn budgets(&self) -> BudgetSummary {
        let results = self.fan_out("budgets", |provider| provider.budgets()).await;
        merge_budgets(collect_tagged("budgets", results))
    }

    pub async fn services_breakdown(&self) -> ServicesSummary {
        let results = self
            .fan_out("services_breakdown", |provider| {
                provider.services_breakdown()
            })
            .await;

        let mut providers = ProviderMap::new();
        let mut total_cost = 0.0;
        let mut total_services = 0;
        for (name, result) in results {
            match result {
                Ok(breakdown) => {
                    total_cost += breakdown.total_cost;
                    total_services += breakdown.total_services;
                    providers.insert(name, ProviderEntry::Data(breakdown));
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "Services breakdown failed for provider");
                    providers.insert(name, ProviderEntry::Failed { error: e.to_string() });
                }
            }
        }

        ServicesSummary {
            providers,
            total_cost: round_to(total_cost, 2),
            total_services,
        }
    }

    /// Run `call` against every active provider, keeping directory order
    async fn fan_out<T, F>(&self, operation: &'static str, call: F) -> Vec<(String, ProviderResult<T>)>
    where
        T: Send,
        F: for<'p> Fn(&'p dyn CloudProvider) -> BoxFuture<'p, ProviderResult<T>> + Send + Sync,
    {
        let active = self.directory.active_providers();
        info!(
            operation,
            providers = active.len(),
            concurrent = self.settings.concurrent,
            "Aggregating across providers"
        );

        let call = &call;
        let calls = active.into_iter().map(|entry| async move {
            let result = self.call_provider(&entry.name, call).await;
            (entry.name, result)
        });

        if self.settings.concurrent {
            join_all(calls).await
        } else {
            let mut results = Vec::new();
            for call in calls {
                results.push(call.await);
            }
            results
        }
    }

    async fn call_provider<T, F>(&self, name: &str, call: &F) -> ProviderResult<T>
    where
        F: for<'p> Fn(&'p dyn CloudProvider) -> BoxFuture<'p, ProviderResult<T>>,
    {
        let settings = self.directory.config(name).unwrap_or_default();
        let provider = self.factory.create(name, &settings)?;
        debug!(provider = %name, "Calling provider");

        let pending = call(provider.as_ref());
        match self.settings.timeout() {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                ProviderError::timeout(
                    "aggregation",
                    format!("{} did not respond within {}s", name, limit.as_secs()),
                )
            })?,
            None => pending.await,
        }
    }
}

/// Tag successful provider lists; failed providers are skipped
fn collect_tagged<T>(
    operation: &'static str,
    results: Vec<(String, ProviderResult<Vec<T>>)>,
) -> Vec<Tagged<T>> {
    let mut tagged = Vec::new();
    for (name, result) in results {
        match result {
            Ok(items) => tagged.extend(items.into_iter().map(|item| Tagged::new(name.clone(), item))),
            Err(e) => warn!(provider = %name, operation, error = %e, "Skipping provider"),
        }
    }
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        Alert, Anomaly, Budget, BudgetKind, BudgetStatus, CostLineItem, DailyCostPoint, Forecast,
        MetricSnapshot, Outcome, Severity, TimeseriesSeries,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    /// Fixed-data provider; `broken` makes every insight call fail
    #[derive(Debug)]
    struct StubProvider {
        name: String,
        cost: f64,
        broken: bool,
        delay: Option<Duration>,
    }

    impl StubProvider {
        fn check(&self) -> ProviderResult<()> {
            if self.broken {
                Err(ProviderError::other("stub", format!("{} is down", self.name)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CloudProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Outcome::Data(vec![
                CostLineItem::new("Compute", self.cost).with_category("Compute"),
            ])
        }

        async fn daily_costs(&self, _days: u32) -> Outcome<Vec<DailyCostPoint>> {
            Outcome::Data(Vec::new())
        }

        async fn live_metrics(&self) -> MetricSnapshot {
            MetricSnapshot::new(0.0, 0)
        }

        async fn timeseries(&self, metric: &str, _minutes: u32) -> TimeseriesSeries {
            TimeseriesSeries::empty(metric)
        }

        async fn anomalies(&self) -> ProviderResult<Vec<Anomaly>> {
            self.check()?;
            Ok(vec![Anomaly {
                id: format!("{}-anomaly", self.name),
                service: "Compute".into(),
                category: "Compute".into(),
                expected_cost: self.cost,
                actual_cost: self.cost * 1.5,
                deviation_percent: self.cost / 10.0,
                severity: Severity::High,
                detected_at: "2024-06-01T00:00:00Z".into(),
                description: "d".into(),
                recommendation: "r".into(),
            }])
        }

        async fn forecast(&self, _days: u32) -> ProviderResult<Forecast> {
            self.check()?;
            Ok(Forecast {
                projected_eom: self.cost * 2.0,
                ..Forecast::empty(self.cost)
            })
        }

        async fn alerts(&self) -> ProviderResult<Vec<Alert>> {
            self.check()?;
            Ok(vec![Alert {
                id: self.name.clone(),
                kind: "budget".into(),
                title: "t".into(),
                message: "m".into(),
                severity: Severity::Warning,
                acknowledged: false,
                created_at: format!("2024-06-0{}T00:00:00Z", self.name.len() % 9),
            }])
        }

        async fn budgets(&self) -> ProviderResult<Vec<Budget>> {
            self.check()?;
            Ok(vec![Budget {
                id: "overall".into(),
                name: "Overall".into(),
                kind: BudgetKind::Overall,
                budget_amount: 1000.0,
                spent_amount: self.cost,
                remaining_amount: 1000.0 - self.cost,
                utilization_percent: self.cost / 10.0,
                projected_eom: self.cost,
                projected_utilization: self.cost / 10.0,
                period: "monthly".into(),
                start_date: "2024-06-01".into(),
                end_date: "2024-06-30".into(),
                status: BudgetStatus::OnTrack,
            }])
        }

        async fn services_breakdown(&self) -> ProviderResult<crate::core::types::ServicesBreakdown> {
            self.check()?;
            let items = vec![CostLineItem::new("Compute", self.cost).with_category("Compute")];
            Ok(crate::core::types::ServicesBreakdown::from_items(&items))
        }
    }

    fn stub_constructor(settings: &ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> {
        Ok(Box::new(StubProvider {
            name: settings.get_str("name").unwrap_or("stub").to_string(),
            cost: settings.get("cost").and_then(|v| v.as_f64()).unwrap_or(0.0),
            broken: settings.get_bool("broken").unwrap_or(false),
            delay: settings
                .get("delay_ms")
                .and_then(|v| v.as_u64())
                .map(Duration::from_millis),
        }))
    }

    fn wrecked_constructor(_: &ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> {
        Err(ProviderError::configuration(
            "stub",
            "wrecked account_id required",
        ))
    }

    /// Directory over `(id, settings)` pairs, in listing order
    fn directory(entries: Vec<(&'static str, ProviderSettings)>) -> MockProviderDirectory {
        let mut directory = MockProviderDirectory::new();
        let names: Vec<&'static str> = entries.iter().map(|(name, _)| *name).collect();
        let lookup = entries.clone();

        directory
            .expect_active_providers()
            .returning(move || names.iter().map(|n| ActiveProvider::configured(*n)).collect());
        directory
            .expect_config()
            .returning(move |id| lookup.iter().find(|(n, _)| *n == id).map(|(_, s)| s.clone()));
        directory
            .expect_is_provider_configured()
            .returning(move |id| entries.iter().any(|(n, _)| *n == id));
        directory
    }

    fn stub(name: &str, cost: f64) -> ProviderSettings {
        ProviderSettings::new().with("name", name).with("cost", cost)
    }

    fn aggregator(
        entries: Vec<(&'static str, ProviderSettings)>,
        settings: AggregationConfig,
    ) -> Aggregator {
        let mut factory = ProviderFactory::empty(false);
        for (id, _) in &entries {
            if id.starts_with("wrecked") {
                factory.register(id, wrecked_constructor);
            } else {
                factory.register(id, stub_constructor);
            }
        }
        Aggregator::new(Arc::new(factory), Arc::new(directory(entries)), settings)
    }

    #[tokio::test]
    async fn test_cost_summary_records_construction_failure() {
        let aggregator = aggregator(
            vec![
                ("alpha", stub("alpha", 120.456)),
                ("wrecked", ProviderSettings::new()),
                ("beta", stub("beta", 80.0)),
            ],
            AggregationConfig::default(),
        );

        let summary = aggregator.cost_summary().await;
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0], ProviderCostSummary::active("alpha", 120.46));
        assert_eq!(
            summary[1],
            ProviderCostSummary::failed("wrecked", "wrecked account_id required")
        );
        assert_eq!(summary[2], ProviderCostSummary::active("beta", 80.0));
    }

    #[tokio::test]
    async fn test_list_endpoints_skip_failing_providers() {
        let aggregator = aggregator(
            vec![
                ("alpha", stub("alpha", 300.0)),
                ("broken", stub("broken", 50.0).with("broken", true)),
                ("wrecked", ProviderSettings::new()),
                ("beta", stub("beta", 500.0)),
            ],
            AggregationConfig::default(),
        );

        let anomalies = aggregator.anomalies().await;
        let providers: Vec<_> = anomalies.iter().map(|a| a.provider.as_str()).collect();
        assert_eq!(providers, ["beta", "alpha"]);

        let budgets = aggregator.budgets().await;
        assert_eq!(budgets.budgets.len(), 2);
        assert_eq!(budgets.total_budget, 2000.0);
        assert_eq!(budgets.total_spent, 800.0);
        assert_eq!(budgets.overall_utilization, 40.0);

        let alerts = aggregator.alerts().await;
        assert_eq!(alerts.total_count, 2);
        assert!(alerts.alerts.iter().all(|a| a.provider != "broken"));

        let recommendations = aggregator.recommendations().await;
        assert_eq!(recommendations.recommendation_count, 0);
    }

    #[tokio::test]
    async fn test_keyed_endpoints_record_errors() {
        let aggregator = aggregator(
            vec![
                ("alpha", stub("alpha", 100.0)),
                ("broken", stub("broken", 50.0).with("broken", true)),
            ],
            AggregationConfig::default(),
        );

        let forecasts = aggregator.forecasts(7).await;
        assert_eq!(forecasts.total_current_mtd, 100.0);
        assert_eq!(forecasts.total_projected_eom, 200.0);
        assert_eq!(
            forecasts.providers.get("broken"),
            Some(&ProviderEntry::Failed {
                error: "stub error: broken is down".into()
            })
        );

        let services = aggregator.services_breakdown().await;
        assert_eq!(services.total_cost, 100.0);
        assert_eq!(services.total_services, 1);
        assert!(matches!(
            services.providers.get("broken"),
            Some(ProviderEntry::Failed { .. })
        ));
        let json = serde_json::to_value(&services).unwrap();
        assert_eq!(json["providers"]["broken"]["error"], "stub error: broken is down");
    }

    #[tokio::test]
    async fn test_concurrent_fan_out_keeps_order() {
        let aggregator = aggregator(
            vec![
                ("slow", stub("slow", 1.0).with("delay_ms", 50)),
                ("fast", stub("fast", 2.0)),
            ],
            AggregationConfig {
                concurrent: true,
                provider_timeout_secs: None,
            },
        );

        let summary = aggregator.cost_summary().await;
        let names: Vec<_> = summary.iter().map(|s| s.provider.as_str()).collect();
        assert_eq!(names, ["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let aggregator = aggregator(
            vec![
                ("hung", stub("hung", 1.0).with("delay_ms", 3_000)),
                ("fast", stub("fast", 2.0)),
            ],
            AggregationConfig {
                concurrent: true,
                provider_timeout_secs: Some(1),
            },
        );

        let summary = aggregator.cost_summary().await;
        assert_eq!(
            summary[0],
            ProviderCostSummary::failed(
                "hung",
                "Timeout for aggregation: hung did not respond within 1s"
            )
        );
        assert_eq!(summary[1], ProviderCostSummary::active("fast", 2.0));
    }

    #[test]
    fn test_provider_for_unknown_is_not_configured() {
        let aggregator = aggregator(vec![("alpha", stub("alpha", 1.0))], AggregationConfig::default());

        let err = aggregator.provider_for("gamma").unwrap_err();
        assert_eq!(err.to_string(), "gamma not configured");

        let provider = aggregator.provider_for("alpha").unwrap();
        assert_eq!(provider.name(), "alpha");
    }

    #[tokio::test]
    async fn test_no_active_providers_yields_empty_results() {
        let aggregator = aggregator(Vec::new(), AggregationConfig::default());

        assert!(aggregator.cost_summary().await.is_empty());
        assert!(aggregator.anomalies().await.is_empty());
        let budgets = aggregator.budgets().await;
        assert_eq!(budgets.overall_utilization, 0.0);
        assert!(aggregator.forecasts(7).await.providers.is_empty());
    }
}
