//! Authentication endpoints

use crate::auth::{
    ClientZone, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::server::AppState;
use crate::server::middleware::AuthenticatedUser;
use crate::utils::error::Result;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const FORGOT_MESSAGE: &str = "If the account exists, we sent instructions.";
const TIMEZONE_HEADER: &str = "X-Timezone";

#[derive(Debug, Default, Deserialize)]
struct ZoneQuery {
    tz: Option<String>,
}

/// `X-Timezone` header first, then the `tz` query parameter
fn client_zone(req: &HttpRequest) -> ClientZone {
    let header = req
        .headers()
        .get(TIMEZONE_HEADER)
        .and_then(|value| value.to_str().ok());
    let query = web::Query::<ZoneQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    ClientZone::resolve([header, query.tz.as_deref()])
}

/// Configure authentication routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me))
            .route("/logout", web::post().to(logout))
            .route("/forgot", web::post().to(forgot))
            .route("/reset", web::post().to(reset)),
    );
}

async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = state.auth.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "ok": true,
        "message": "User registered successfully.",
        "user": user,
    })))
}

async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let response = state
        .auth
        .login(request.into_inner(), &client_zone(&req))
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "user": user.info() }))
}

/// Tokens are stateless; the client discards its copy
async fn logout(user: AuthenticatedUser) -> HttpResponse {
    info!("User {} logged out", user.info().username);
    HttpResponse::Ok().json(json!({ "ok": true }))
}

async fn forgot(
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    let token = state.auth.request_password_reset(request.into_inner()).await?;

    let mut body = json!({ "ok": true, "message": FORGOT_MESSAGE });
    if let Some(token) = token.filter(|_| state.exposes_reset_token()) {
        body["reset_token"] = json!(token);
    }
    Ok(HttpResponse::Ok().json(body))
}

async fn reset(
    state: web::Data<AppState>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    state.auth.reset_password(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "message": "Password has been reset.",
    })))
}
