//! Index page and liveness check

use actix_web::{HttpResponse, web};
use serde_json::json;

const INDEX_HTML: &str = "<h3>Multi-Cloud Intelligence Dashboard API</h3>\
<p>Health: <a href='/api/health'>/api/health</a></p>\
<p>Login: <code>POST /api/auth/login</code></p>";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/health", web::get().to(health_check));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// Always healthy while the process serves requests
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({"ok": true, "service": "multi-cloud-dashboard"}))
}
