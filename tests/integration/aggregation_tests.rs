//! Cross-provider aggregation over mock providers

#[cfg(test)]
mod tests {
    use multicloud_dashboard::config::AggregationConfig;
    use multicloud_dashboard::core::aggregation::Aggregator;
    use multicloud_dashboard::core::providers::{ProviderFactory, ProviderSettings};
    use multicloud_dashboard::core::types::{ProviderEntry, ProviderStatus};
    use multicloud_dashboard::services::CloudAccountManager;
    use std::sync::Arc;

    fn aggregator(
        use_mock_data: bool,
        accounts: CloudAccountManager,
        concurrent: bool,
    ) -> Aggregator {
        Aggregator::new(
            Arc::new(ProviderFactory::new(use_mock_data)),
            Arc::new(accounts),
            AggregationConfig {
                concurrent,
                provider_timeout_secs: Some(5),
            },
        )
    }

    fn two_mock_accounts() -> CloudAccountManager {
        CloudAccountManager::new()
            .with_account("mock_aws", ProviderSettings::new())
            .with_account("mock_gcp", ProviderSettings::new())
    }

    #[tokio::test]
    async fn test_cost_summary_keeps_broken_accounts() {
        // `gcp` without a project id fails construction outside mock mode
        let accounts = two_mock_accounts().with_account("gcp", ProviderSettings::new());
        let summary = aggregator(false, accounts, false).cost_summary().await;

        let providers: Vec<_> = summary.iter().map(|s| s.provider.as_str()).collect();
        assert_eq!(providers, ["gcp", "mock_aws", "mock_gcp"]);

        assert_eq!(summary[0].status, ProviderStatus::Error);
        assert_eq!(summary[0].error.as_deref(), Some("GCP project_id required"));
        for line in &summary[1..] {
            assert_eq!(line.status, ProviderStatus::Active);
            assert!(line.mtd_cost.unwrap() > 0.0);
        }
    }

    #[tokio::test]
    async fn test_forecasts_record_failures_inline() {
        let accounts = two_mock_accounts().with_account("gcp", ProviderSettings::new());
        let summary = aggregator(false, accounts, true).forecasts(7).await;

        assert_eq!(summary.providers.len(), 3);
        assert!(matches!(
            summary.providers.get("gcp"),
            Some(ProviderEntry::Failed { .. })
        ));

        let mut expected_mtd = 0.0;
        for name in ["mock_aws", "mock_gcp"] {
            let Some(ProviderEntry::Data(forecast)) = summary.providers.get(name) else {
                panic!("{} should have a forecast", name);
            };
            expected_mtd += forecast.current_mtd;
        }
        assert!((summary.total_current_mtd - expected_mtd).abs() < 0.02);
    }

    #[tokio::test]
    async fn test_list_merges_are_tagged_and_ordered() {
        let aggregator = aggregator(true, two_mock_accounts(), false);

        let anomalies = aggregator.anomalies().await;
        assert!(
            anomalies
                .windows(2)
                .all(|w| w[0].item.deviation_percent >= w[1].item.deviation_percent)
        );
        assert!(
            anomalies
                .iter()
                .all(|a| a.provider == "mock_aws" || a.provider == "mock_gcp")
        );

        let alerts = aggregator.alerts().await;
        assert_eq!(alerts.total_count, alerts.alerts.len());
        assert!(
            alerts
                .alerts
                .windows(2)
                .all(|w| w[0].item.created_at >= w[1].item.created_at)
        );

        let recommendations = aggregator.recommendations().await;
        let monthly: f64 = recommendations
            .recommendations
            .iter()
            .map(|r| r.item.potential_savings_monthly)
            .sum();
        assert!((recommendations.total_potential_savings_monthly - monthly).abs() < 0.01);
        assert!(
            (recommendations.total_potential_savings_yearly
                - recommendations.total_potential_savings_monthly * 12.0)
                .abs()
                < 0.1
        );
    }

    #[tokio::test]
    async fn test_budget_and_services_totals() {
        let aggregator = aggregator(true, two_mock_accounts(), true);

        let budgets = aggregator.budgets().await;
        assert!(budgets.total_budget > 0.0);
        assert!(
            (budgets.total_remaining - (budgets.total_budget - budgets.total_spent)).abs() < 0.02
        );

        let services = aggregator.services_breakdown().await;
        assert_eq!(services.providers.len(), 2);
        assert!(services.total_services > 0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_lookup() {
        let aggregator = aggregator(true, two_mock_accounts(), false);
        let err = aggregator.provider_for("azure").unwrap_err();
        assert_eq!(err.to_string(), "azure not configured");
        assert!(aggregator.provider_for("MOCK_AWS").is_ok());
    }
}
