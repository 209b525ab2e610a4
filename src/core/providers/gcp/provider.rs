//! BigQuery billing export and Cloud Monitoring backed provider

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{GcpAuth, GcpConfig};
use crate::core::providers::shared::{
    DEFAULT_HTTP_TIMEOUT, TokenCache, build_http_client, ensure_success, mean, trailing_window,
};
use crate::core::providers::{CloudProvider, ProviderError, ProviderResult};
use crate::core::types::{
    CostLineItem, DailyCostPoint, MetricSnapshot, Outcome, TimeseriesSeries, round_to,
    sort_by_cost_desc,
};

const CPU_METRIC: &str = "compute.googleapis.com/instance/cpu/utilization";
const TIMESERIES_MESSAGE: &str = "GCP timeseries not yet fully implemented";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BigQueryResponse {
    #[serde(default)]
    job_complete: Option<bool>,
    #[serde(default)]
    rows: Vec<BigQueryRow>,
}

#[derive(Debug, Deserialize)]
struct BigQueryRow {
    f: Vec<BigQueryCell>,
}

#[derive(Debug, Deserialize)]
struct BigQueryCell {
    v: Value,
}

impl BigQueryRow {
    fn text(&self, idx: usize) -> Option<&str> {
        self.f.get(idx).and_then(|cell| cell.v.as_str())
    }

    /// BigQuery returns every scalar as a string
    fn number(&self, idx: usize) -> f64 {
        self.text(idx)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesList {
    #[serde(default, rename = "timeSeries")]
    time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(default)]
    points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    interval: Interval,
    value: TypedValue,
}

#[derive(Debug, Deserialize)]
struct Interval {
    #[serde(rename = "endTime")]
    end_time: String,
}

#[derive(Debug, Deserialize)]
struct TypedValue {
    #[serde(default, rename = "doubleValue")]
    double_value: Option<f64>,
}

#[derive(Debug)]
pub struct GcpProvider {
    config: GcpConfig,
    auth: GcpAuth,
    http_client: reqwest::Client,
}

impl GcpProvider {
    /// Adapter whose access tokens live in `tokens`
    pub fn new(config: GcpConfig, tokens: TokenCache) -> ProviderResult<Self> {
        let http_client = build_http_client("gcp", DEFAULT_HTTP_TIMEOUT)?;
        Ok(Self {
            auth: GcpAuth::new(&config, http_client.clone(), tokens),
            config,
            http_client,
        })
    }

    async fn token(&self) -> ProviderResult<String> {
        self.auth
            .get_access_token()
            .await
            .map_err(|e| ProviderError::authentication("gcp", format!("{:#}", e)))
    }

    fn billing_table(&self) -> ProviderResult<&str> {
        self.config.billing_table.as_deref().ok_or_else(|| {
            ProviderError::configuration("gcp", "GCP billing_table required for cost queries")
        })
    }

    async fn run_query(&self, sql: String) -> ProviderResult<Vec<BigQueryRow>> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/queries",
            self.config.bigquery_endpoint.trim_end_matches('/'),
            self.config.project_id
        );
        debug!(project = %self.config.project_id, "Running BigQuery billing query");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.token().await?)
            .json(&json!({ "query": sql, "useLegacySql": false, "timeoutMs": 30000 }))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("gcp", e))?;

        let parsed: BigQueryResponse = ensure_success("gcp", response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::response_parsing("gcp", e.to_string()))?;

        if parsed.job_complete == Some(false) {
            return Err(ProviderError::timeout(
                "gcp",
                "BigQuery job did not complete in time",
            ));
        }
        Ok(parsed.rows)
    }

    async fn query_month_to_date(&self) -> ProviderResult<Vec<CostLineItem>> {
        let today = Utc::now().date_naive();
        let sql = format!(
            "SELECT service.description AS service, SUM(cost) AS cost \
             FROM `{}` WHERE invoice.month = '{:04}{:02}' \
             GROUP BY service ORDER BY cost DESC",
            self.billing_table()?,
            today.year(),
            today.month()
        );

        let mut items: Vec<CostLineItem> = self
            .run_query(sql)
            .await?
            .iter()
            .map(|row| {
                CostLineItem::new(row.text(0).unwrap_or("Unknown"), round_to(row.number(1), 2))
                    .with_project(self.config.project_id.clone())
            })
            .collect();
        sort_by_cost_desc(&mut items);
        Ok(items)
    }

    async fn query_daily(&self, days: u32) -> ProviderResult<Vec<DailyCostPoint>> {
        let (start, end) = trailing_window("gcp", Utc::now().date_naive(), days)?;
        let sql = format!(
            "SELECT FORMAT_DATE('%Y-%m-%d', DATE(usage_start_time)) AS day, SUM(cost) AS cost \
             FROM `{}` WHERE DATE(usage_start_time) BETWEEN '{}' AND '{}' \
             GROUP BY day ORDER BY day",
            self.billing_table()?,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let mut points: Vec<DailyCostPoint> = self
            .run_query(sql)
            .await?
            .iter()
            .filter_map(|row| DailyCostPoint::from_raw(row.text(0)?, round_to(row.number(1), 2)))
            .collect();
        points.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(points)
    }

    /// Mean-aligned CPU utilization series (0 to 1) over the trailing window
    async fn cpu_series(
        &self,
        minutes: u32,
        alignment_secs: u32,
        reduce: bool,
    ) -> ProviderResult<Vec<TimeSeries>> {
        let end = Utc::now();
        let start = end - Duration::minutes(i64::from(minutes));
        let url = format!(
            "{}/v3/projects/{}/timeSeries",
            self.config.monitoring_endpoint.trim_end_matches('/'),
            self.config.project_id
        );

        let mut params = vec![
            ("filter", format!("metric.type = \"{}\"", CPU_METRIC)),
            (
                "interval.startTime",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                "interval.endTime",
                end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("aggregation.alignmentPeriod", format!("{}s", alignment_secs)),
            ("aggregation.perSeriesAligner", "ALIGN_MEAN".to_string()),
        ];
        if reduce {
            params.push(("aggregation.crossSeriesReducer", "REDUCE_MEAN".to_string()));
        }

        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.token().await?)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("gcp", e))?;

        let list: TimeSeriesList = ensure_success("gcp", response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::response_parsing("gcp", e.to_string()))?;
        Ok(list.time_series)
    }
}

#[async_trait]
impl CloudProvider for GcpProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
        let result = self.query_month_to_date().await;
        if let Err(e) = &result {
            warn!(error = %e, "GCP month-to-date cost query failed");
        }
        result.into()
    }

    async fn daily_costs(&self, days: u32) -> Outcome<Vec<DailyCostPoint>> {
        let result = self.query_daily(days).await;
        if let Err(e) = &result {
            warn!(error = %e, "GCP daily cost query failed");
        }
        result.into()
    }

    async fn live_metrics(&self) -> MetricSnapshot {
        match self.cpu_series(5, 300, false).await {
            Ok(series) => {
                // Points arrive newest first
                let latest: Vec<f64> = series
                    .iter()
                    .filter_map(|s| s.points.first()?.value.double_value)
                    .collect();
                MetricSnapshot::new(
                    round_to(mean(&latest).unwrap_or(0.0) * 100.0, 1),
                    series.len() as u32,
                )
            }
            Err(e) => {
                warn!(error = %e, "GCP live metrics query failed");
                MetricSnapshot::failed(e)
            }
        }
    }

    async fn timeseries(&self, metric: &str, minutes: u32) -> TimeseriesSeries {
        if metric != "cpu" {
            return TimeseriesSeries::not_implemented(metric, TIMESERIES_MESSAGE);
        }

        match self.cpu_series(minutes, 60, true).await {
            Ok(series) => {
                let points = series.iter().flat_map(|s| &s.points).filter_map(|point| {
                    let ts = DateTime::parse_from_rfc3339(&point.interval.end_time).ok()?;
                    let value = point.value.double_value?;
                    Some((ts.with_timezone(&Utc), round_to(value * 100.0, 1)))
                });
                TimeseriesSeries::from_points(metric, points)
            }
            Err(e) => {
                warn!(error = %e, "GCP timeseries query failed");
                TimeseriesSeries::failed(metric, e)
            }
        }
    }
}
