//! HTTP routes
//!
//! Aggregate routes are registered before the per-provider ones so `costs/summary` and the
//! `*/all` paths are never read as a provider id.

pub mod aggregate;
pub mod auth;
pub mod health;
pub mod providers;

use crate::utils::error::ErrorResponse;
use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};

/// Configure every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes).service(
        web::scope("/api")
            .configure(auth::configure_routes)
            .configure(aggregate::configure_routes)
            .configure(providers::configure_routes),
    );
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { error: message })
}

/// Malformed JSON bodies answer 400 with the usual error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let response = bad_request(format!("Invalid request body: {}", err));
        InternalError::from_response(err, response).into()
    })
}

/// Malformed query values (e.g. `days=abc`) answer 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response = bad_request(format!("Invalid query parameters: {}", err));
        InternalError::from_response(err, response).into()
    })
}
