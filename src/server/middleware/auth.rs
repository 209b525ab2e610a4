//! Bearer token authentication for protected routes

use crate::auth::{JwtHandler, Role, UserInfo};
use crate::server::state::AppState;
use crate::utils::error::{DashboardError, Result};
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::LocalBoxFuture;
use tracing::debug;

/// The account behind a valid `Authorization: Bearer` header
///
/// Any failure (missing header, bad signature, expired token, deleted account) rejects
/// the request with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserInfo);

impl AuthenticatedUser {
    pub fn info(&self) -> &UserInfo {
        &self.0
    }

    pub fn into_inner(self) -> UserInfo {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    JwtHandler::extract_token_from_header(header).map(str::to_string)
}

impl FromRequest for AuthenticatedUser {
    type Error = DashboardError;
    type Future = LocalBoxFuture<'static, Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| DashboardError::internal("Application state missing"))?;
            let token =
                token.ok_or_else(|| DashboardError::unauthorized("Missing bearer token"))?;

            state.auth.authenticate(&token).await.map(AuthenticatedUser).map_err(|e| {
                debug!("Rejected bearer token: {}", e);
                match e {
                    DashboardError::Unauthorized(_) => e,
                    other => DashboardError::unauthorized(other.to_string()),
                }
            })
        })
    }
}

/// Reject callers whose role is not listed
pub fn require_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.0.role) {
        Ok(())
    } else {
        Err(DashboardError::forbidden(format!(
            "Role {} not permitted",
            user.0.role
        )))
    }
}
