//! Cost Management REST backed provider

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{AzureAuth, AzureConfig};
use crate::core::providers::shared::{
    DEFAULT_HTTP_TIMEOUT, TokenCache, build_http_client, ensure_success, month_start,
    trailing_window,
};
use crate::core::providers::{CloudProvider, ProviderError, ProviderResult};
use crate::core::types::{
    CostLineItem, DailyCostPoint, MetricSnapshot, Outcome, TimeseriesSeries, round_to,
    sort_by_cost_desc,
};

const API_VERSION: &str = "2023-03-01";
const DAILY_MESSAGE: &str = "Azure daily costs not yet fully implemented";
const LIVE_METRICS_MESSAGE: &str = "Azure live metrics not yet fully implemented";
const TIMESERIES_MESSAGE: &str = "Azure timeseries not yet fully implemented";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    properties: QueryProperties,
}

#[derive(Debug, Deserialize)]
struct QueryProperties {
    #[serde(default)]
    columns: Vec<QueryColumn>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryColumn {
    name: String,
}

impl QueryProperties {
    fn column(&self, names: &[&str]) -> ProviderResult<usize> {
        self.columns
            .iter()
            .position(|c| names.iter().any(|n| c.name.eq_ignore_ascii_case(n)))
            .ok_or_else(|| {
                ProviderError::response_parsing("azure", format!("missing column {}", names[0]))
            })
    }
}

fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// `UsageDate` arrives as a number like `20240105` or as a string
fn usage_date(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[derive(Debug)]
pub struct AzureProvider {
    config: AzureConfig,
    auth: AzureAuth,
    http_client: reqwest::Client,
}

impl AzureProvider {
    /// Adapter whose access tokens live in `tokens`
    pub fn new(config: AzureConfig, tokens: TokenCache) -> ProviderResult<Self> {
        let http_client = build_http_client("azure", DEFAULT_HTTP_TIMEOUT)?;
        Ok(Self {
            auth: AzureAuth::new(&config, http_client.clone(), tokens),
            config,
            http_client,
        })
    }

    fn query_body(from: NaiveDate, to: NaiveDate, granularity: &str, group_by: Option<&str>) -> Value {
        let mut dataset = json!({
            "granularity": granularity,
            "aggregation": {
                "totalCost": { "name": "PreTaxCost", "function": "Sum" }
            }
        });
        if let Some(dimension) = group_by {
            dataset["grouping"] = json!([{ "type": "Dimension", "name": dimension }]);
        }

        json!({
            "type": "Usage",
            "timeframe": "Custom",
            "timePeriod": {
                "from": format!("{}T00:00:00Z", from.format("%Y-%m-%d")),
                "to": format!("{}T23:59:59Z", to.format("%Y-%m-%d")),
            },
            "dataset": dataset,
        })
    }

    async fn run_query(&self, body: &Value) -> ProviderResult<QueryProperties> {
        let token = self
            .auth
            .get_access_token()
            .await
            .map_err(|e| ProviderError::authentication("azure", format!("{:#}", e)))?;

        debug!(subscription = %self.config.subscription_id, "Running Azure cost query");
        let response = self
            .http_client
            .post(self.config.query_url(API_VERSION))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("azure", e))?;

        let response = ensure_success("azure", response).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::response_parsing("azure", e.to_string()))?;
        Ok(parsed.properties)
    }

    async fn query_month_to_date(&self) -> ProviderResult<Vec<CostLineItem>> {
        let today = Utc::now().date_naive();
        let result = self
            .run_query(&Self::query_body(
                month_start(today),
                today,
                "None",
                Some("ServiceName"),
            ))
            .await?;

        let cost_col = result.column(&["PreTaxCost", "Cost", "totalCost"])?;
        let service_col = result.column(&["ServiceName"])?;

        let mut items: Vec<CostLineItem> = result
            .rows
            .iter()
            .map(|row| {
                let service = row
                    .get(service_col)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Unknown");
                CostLineItem::new(service, round_to(number(row.get(cost_col)), 2))
            })
            .collect();
        sort_by_cost_desc(&mut items);
        Ok(items)
    }

    async fn query_daily(&self, days: u32) -> ProviderResult<Vec<DailyCostPoint>> {
        let (from, to) = trailing_window("azure", Utc::now().date_naive(), days)?;
        let result = self
            .run_query(&Self::query_body(from, to, "Daily", None))
            .await?;

        let cost_col = result.column(&["PreTaxCost", "Cost", "totalCost"])?;
        let date_col = result.column(&["UsageDate"])?;

        let mut points: Vec<DailyCostPoint> = result
            .rows
            .iter()
            .filter_map(|row| {
                let raw = usage_date(row.get(date_col))?;
                DailyCostPoint::from_raw(&raw, round_to(number(row.get(cost_col)), 2))
            })
            .collect();
        points.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(points)
    }
}

#[async_trait]
impl CloudProvider for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
        let result = self.query_month_to_date().await;
        if let Err(e) = &result {
            warn!(error = %e, "Azure month-to-date cost query failed");
        }
        result.into()
    }

    async fn daily_costs(&self, days: u32) -> Outcome<Vec<DailyCostPoint>> {
        match self.query_daily(days).await {
            Ok(points) => Outcome::Data(points),
            Err(e) => {
                warn!(error = %e, "Azure daily cost query failed");
                Outcome::failed_with_message(e, DAILY_MESSAGE)
            }
        }
    }

    async fn live_metrics(&self) -> MetricSnapshot {
        MetricSnapshot::placeholder(LIVE_METRICS_MESSAGE)
    }

    async fn timeseries(&self, metric: &str, _minutes: u32) -> TimeseriesSeries {
        TimeseriesSeries::not_implemented(metric, TIMESERIES_MESSAGE)
    }
}
