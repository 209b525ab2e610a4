//! Provider factory integration tests

#[cfg(test)]
mod tests {
    use multicloud_dashboard::core::providers::{
        CloudProvider, ProviderError, ProviderFactory, ProviderSettings,
    };
    use multicloud_dashboard::core::types::{
        CostLineItem, DailyCostPoint, MetricSnapshot, Outcome, TimeseriesSeries,
    };

    #[tokio::test]
    async fn test_mock_mode_serves_any_id() {
        let factory = ProviderFactory::new(true);
        for id in ["aws", "AZURE", "gcp", "oracle"] {
            let provider = factory.create(id, &ProviderSettings::new()).unwrap();
            assert_eq!(provider.name(), id.to_lowercase());

            let costs = provider.month_to_date_costs().await;
            assert!(!costs.is_failed(), "{} should have mock costs", id);
        }
    }

    #[tokio::test]
    async fn test_mock_ids_work_outside_mock_mode() {
        let factory = ProviderFactory::new(false);
        let provider = factory
            .create("mock_gcp", &ProviderSettings::new())
            .unwrap();
        assert_eq!(provider.name(), "mock_gcp");

        let Outcome::Data(points) = provider.daily_costs(5).await else {
            panic!("mock daily costs should succeed");
        };
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let factory = ProviderFactory::new(false);
        let err = factory
            .create("oracle", &ProviderSettings::new())
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedProvider { .. }));
        assert_eq!(err.to_string(), "Unsupported provider: oracle");
    }

    #[test]
    fn test_real_adapters_validate_settings() {
        let factory = ProviderFactory::new(false);

        let err = factory.create("gcp", &ProviderSettings::new()).unwrap_err();
        assert_eq!(err.to_string(), "GCP project_id required");

        let err = factory
            .create("azure", &ProviderSettings::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Azure subscription_id required");
    }

    #[derive(Debug)]
    struct FixedProvider;

    #[async_trait::async_trait]
    impl CloudProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
            Outcome::Data(vec![CostLineItem::new("Compute", 12.0)])
        }

        async fn daily_costs(&self, _days: u32) -> Outcome<Vec<DailyCostPoint>> {
            Outcome::Data(Vec::new())
        }

        async fn live_metrics(&self) -> MetricSnapshot {
            MetricSnapshot::placeholder("none")
        }

        async fn timeseries(&self, metric: &str, _minutes: u32) -> TimeseriesSeries {
            TimeseriesSeries::empty(metric)
        }
    }

    #[tokio::test]
    async fn test_registered_adapter_uses_default_extensions() {
        let mut factory = ProviderFactory::empty(false);
        factory.register("Fixed", |_| Ok(Box::new(FixedProvider) as Box<dyn CloudProvider>));

        let provider = factory.create("FIXED", &ProviderSettings::new()).unwrap();
        assert_eq!(provider.month_to_date_total().await, 12.0);
        assert!(provider.anomalies().await.unwrap().is_empty());

        let forecast = provider.forecast(7).await.unwrap();
        assert_eq!(forecast.current_mtd, 12.0);
        assert!(forecast.forecast_data.is_empty());

        let breakdown = provider.services_breakdown().await.unwrap();
        assert_eq!(breakdown.total_services, 1);
        assert_eq!(breakdown.breakdown[0].category, "Other");
    }
}
