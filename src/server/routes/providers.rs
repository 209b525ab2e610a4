//! Single-provider endpoints
//!
//! Each handler resolves the adapter for the `{provider}` path segment; an id without
//! configuration answers 404 and any adapter error answers 500.

use crate::auth::Role;
use crate::core::providers::shared::MAX_WINDOW_DAYS;
use crate::server::AppState;
use crate::server::middleware::{AuthenticatedUser, require_role};
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Deserializer, de};
use tracing::debug;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/providers", web::get().to(list_providers))
        .route("/{provider}/costs/mtd", web::get().to(mtd_costs))
        .route("/{provider}/costs/daily", web::get().to(daily_costs))
        .route("/{provider}/metrics/live", web::get().to(live_metrics))
        .route("/{provider}/metrics/timeseries", web::get().to(timeseries))
        .route("/{provider}/anomalies", web::get().to(anomalies))
        .route("/{provider}/forecast", web::get().to(forecast))
        .route("/{provider}/recommendations", web::get().to(recommendations))
        .route("/{provider}/alerts", web::get().to(alerts))
        .route("/{provider}/budgets", web::get().to(budgets))
        .route("/{provider}/services/breakdown", web::get().to(services_breakdown));
}

fn default_daily_days() -> u32 {
    30
}

fn default_forecast_days() -> u32 {
    7
}

/// Day windows outside `1..=MAX_WINDOW_DAYS` are rejected while parsing the query
fn window_days<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let days = u32::deserialize(deserializer)?;
    if (1..=MAX_WINDOW_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(de::Error::custom(format!(
            "days must be between 1 and {}",
            MAX_WINDOW_DAYS
        )))
    }
}

fn default_metric() -> String {
    "cpu".to_string()
}

fn default_minutes() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    #[serde(default = "default_daily_days", deserialize_with = "window_days")]
    pub days: u32,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    #[serde(default = "default_forecast_days", deserialize_with = "window_days")]
    pub days: u32,
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesQuery {
    #[serde(rename = "type", default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_minutes")]
    pub minutes: u32,
}

async fn list_providers(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    require_role(&user, &[Role::Admin, Role::Viewer])?;
    Ok(HttpResponse::Ok().json(state.aggregator.active_providers()))
}

async fn mtd_costs(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.month_to_date_costs().await))
}

async fn daily_costs(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    debug!(provider = %path, days = query.days, "Daily costs requested");
    Ok(HttpResponse::Ok().json(provider.daily_costs(query.days).await))
}

async fn live_metrics(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.live_metrics().await))
}

async fn timeseries(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<TimeseriesQuery>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    let series = provider.timeseries(&query.metric, query.minutes).await;
    Ok(HttpResponse::Ok().json(series))
}

async fn anomalies(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.anomalies().await?))
}

async fn forecast(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<ForecastQuery>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.forecast(query.days).await?))
}

async fn recommendations(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.recommendations().await?))
}

async fn alerts(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.alerts().await?))
}

async fn budgets(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.budgets().await?))
}

async fn services_breakdown(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider = state.aggregator.provider_for(&path)?;
    Ok(HttpResponse::Ok().json(provider.services_breakdown().await?))
}
