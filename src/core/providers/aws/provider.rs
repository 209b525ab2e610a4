//! Cost Explorer and CloudWatch backed provider

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::Statistic;
use aws_sdk_costexplorer::config::Region;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, MetricValue,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::{AwsConfig, COST_METRIC, sdk_error};
use crate::core::providers::shared::{mean, month_start, trailing_window};
use crate::core::providers::{CloudProvider, ProviderError, ProviderResult};
use crate::core::types::{
    CostLineItem, DailyCostPoint, MetricSnapshot, Outcome, TimeseriesSeries, round_to,
    sort_by_cost_desc,
};

const TIMESERIES_MESSAGE: &str = "AWS timeseries not yet fully implemented";

#[derive(Debug)]
struct AwsClients {
    cost_explorer: aws_sdk_costexplorer::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

/// AWS adapter; SDK configuration is resolved on first use
#[derive(Debug)]
pub struct AwsProvider {
    config: AwsConfig,
    clients: OnceCell<AwsClients>,
}

impl AwsProvider {
    pub fn new(config: AwsConfig) -> Self {
        Self {
            config,
            clients: OnceCell::new(),
        }
    }

    async fn clients(&self) -> &AwsClients {
        self.clients
            .get_or_init(|| async {
                debug!(
                    account_id = %self.config.account_id,
                    region = %self.config.region,
                    "Loading AWS SDK configuration"
                );
                let mut loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.config.region.clone()));
                if let Some(profile) = &self.config.use_profile {
                    loader = loader.profile_name(profile);
                }
                let shared = loader.load().await;

                AwsClients {
                    cost_explorer: aws_sdk_costexplorer::Client::new(&shared),
                    cloudwatch: aws_sdk_cloudwatch::Client::new(&shared),
                }
            })
            .await
    }

    async fn query_month_to_date(&self) -> ProviderResult<Vec<CostLineItem>> {
        let today = Utc::now().date_naive();
        let output = self
            .clients()
            .await
            .cost_explorer
            .get_cost_and_usage()
            .time_period(date_interval(month_start(today), today)?)
            .granularity(Granularity::Monthly)
            .metrics(COST_METRIC)
            .group_by(
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key("SERVICE")
                    .build(),
            )
            .send()
            .await
            .map_err(|e| sdk_error("GetCostAndUsage", e))?;

        let mut items = Vec::new();
        for result in output.results_by_time() {
            for group in result.groups() {
                let Some(service) = group.keys().first() else {
                    continue;
                };
                items.push(CostLineItem::new(
                    service.as_str(),
                    round_to(amount(group.metrics()), 2),
                ));
            }
        }
        sort_by_cost_desc(&mut items);
        Ok(items)
    }

    async fn query_daily(&self, days: u32) -> ProviderResult<Vec<DailyCostPoint>> {
        let (start, end) = trailing_window("aws", Utc::now().date_naive(), days)?;
        let output = self
            .clients()
            .await
            .cost_explorer
            .get_cost_and_usage()
            .time_period(date_interval(start, end)?)
            .granularity(Granularity::Daily)
            .metrics(COST_METRIC)
            .send()
            .await
            .map_err(|e| sdk_error("GetCostAndUsage", e))?;

        let mut points: Vec<DailyCostPoint> = output
            .results_by_time()
            .iter()
            .filter_map(|result| {
                let start = result.time_period()?.start();
                DailyCostPoint::from_raw(start, round_to(amount(result.total()), 2))
            })
            .collect();
        points.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(points)
    }

    /// EC2 average CPU datapoints over the trailing window
    async fn cpu_datapoints(
        &self,
        minutes: u32,
        period_secs: i32,
    ) -> ProviderResult<Vec<(DateTime<Utc>, f64)>> {
        let end = Utc::now();
        let start = end - Duration::minutes(i64::from(minutes));
        let output = self
            .clients()
            .await
            .cloudwatch
            .get_metric_statistics()
            .namespace("AWS/EC2")
            .metric_name("CPUUtilization")
            .start_time(AwsDateTime::from_secs(start.timestamp()))
            .end_time(AwsDateTime::from_secs(end.timestamp()))
            .period(period_secs)
            .statistics(Statistic::Average)
            .send()
            .await
            .map_err(|e| sdk_error("GetMetricStatistics", e))?;

        Ok(output
            .datapoints()
            .iter()
            .filter_map(|point| {
                let ts = point.timestamp()?;
                let value = point.average()?;
                Some((DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())?, value))
            })
            .collect())
    }
}

/// Cost Explorer end dates are exclusive, so `end` is pushed one day out
fn date_interval(start: NaiveDate, end: NaiveDate) -> ProviderResult<DateInterval> {
    DateInterval::builder()
        .start(start.format("%Y-%m-%d").to_string())
        .end((end + Duration::days(1)).format("%Y-%m-%d").to_string())
        .build()
        .map_err(|e| ProviderError::other("aws", format!("Invalid cost query window: {}", e)))
}

fn amount(metrics: Option<&HashMap<String, MetricValue>>) -> f64 {
    metrics
        .and_then(|m| m.get(COST_METRIC))
        .and_then(|value| value.amount())
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
        let result = self.query_month_to_date().await;
        if let Err(e) = &result {
            warn!(error = %e, "AWS month-to-date cost query failed");
        }
        result.into()
    }

    async fn daily_costs(&self, days: u32) -> Outcome<Vec<DailyCostPoint>> {
        let result = self.query_daily(days).await;
        if let Err(e) = &result {
            warn!(error = %e, "AWS daily cost query failed");
        }
        result.into()
    }

    async fn live_metrics(&self) -> MetricSnapshot {
        match self.cpu_datapoints(5, 300).await {
            Ok(points) => {
                let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
                MetricSnapshot::new(
                    round_to(mean(&values).unwrap_or(0.0), 1),
                    values.len() as u32,
                )
            }
            Err(e) => {
                warn!(error = %e, "AWS live metrics query failed");
                MetricSnapshot::failed(e)
            }
        }
    }

    async fn timeseries(&self, metric: &str, minutes: u32) -> TimeseriesSeries {
        if metric != "cpu" {
            return TimeseriesSeries::not_implemented(metric, TIMESERIES_MESSAGE);
        }

        match self.cpu_datapoints(minutes, 60).await {
            Ok(points) => TimeseriesSeries::from_points(
                metric,
                points.into_iter().map(|(ts, v)| (ts, round_to(v, 1))),
            ),
            Err(e) => {
                warn!(error = %e, "AWS timeseries query failed");
                TimeseriesSeries::failed(metric, e)
            }
        }
    }
}
