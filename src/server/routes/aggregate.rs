//! Cross-provider endpoints
//!
//! A failing provider never fails the request: it is skipped or reported inline.

use crate::server::AppState;
use crate::server::middleware::AuthenticatedUser;
use crate::server::routes::providers::ForecastQuery;
use actix_web::{HttpResponse, web};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/costs/summary", web::get().to(cost_summary))
        .route("/anomalies/all", web::get().to(all_anomalies))
        .route("/forecast/all", web::get().to(all_forecasts))
        .route("/recommendations/all", web::get().to(all_recommendations))
        .route("/alerts/all", web::get().to(all_alerts))
        .route("/budgets/all", web::get().to(all_budgets))
        .route("/services/breakdown/all", web::get().to(all_services));
}

async fn cost_summary(state: web::Data<AppState>, _user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.cost_summary().await)
}

async fn all_anomalies(state: web::Data<AppState>, _user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.anomalies().await)
}

async fn all_forecasts(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<ForecastQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.forecasts(query.days).await)
}

async fn all_recommendations(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.recommendations().await)
}

async fn all_alerts(state: web::Data<AppState>, _user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.alerts().await)
}

async fn all_budgets(state: web::Data<AppState>, _user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.budgets().await)
}

async fn all_services(state: web::Data<AppState>, _user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(state.aggregator.services_breakdown().await)
}
