//! Core authentication system implementation

use super::jwt::JwtHandler;
use super::password::{generate_reset_token, hash_password, verify_password};
use super::types::{
    ClientZone, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    Role, UserInfo, field,
};
use crate::config::AuthConfig;
use crate::storage::StorageLayer;
use crate::storage::database::NewUser;
use crate::utils::error::{DashboardError, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Account registration, login and password recovery
#[derive(Debug, Clone)]
pub struct AuthSystem {
    config: Arc<AuthConfig>,
    storage: Arc<StorageLayer>,
    jwt: Arc<JwtHandler>,
}

impl AuthSystem {
    pub fn new(config: &AuthConfig, storage: Arc<StorageLayer>) -> Self {
        info!("Initializing authentication system");
        Self {
            jwt: Arc::new(JwtHandler::new(config)),
            config: Arc::new(config.clone()),
            storage,
        }
    }

    pub fn jwt(&self) -> &JwtHandler {
        &self.jwt
    }

    /// Create an account; `admin` is only granted while no admin exists
    pub async fn register(&self, request: RegisterRequest) -> Result<UserInfo> {
        let (Some(username), Some(password)) = (field(&request.username), field(&request.password))
        else {
            return Err(DashboardError::bad_request(
                "Username and password are required.",
            ));
        };
        let email = field(&request.email).map(str::to_string);

        let db = self.storage.db();
        let mut role = field(&request.role)
            .and_then(Role::parse)
            .unwrap_or(Role::Viewer);
        if role == Role::Admin && db.role_exists(Role::Admin.as_str()).await? {
            debug!("Admin already exists, registering {} as viewer", username);
            role = Role::Viewer;
        }

        if db.find_user_by_username(username).await?.is_some() {
            return Err(DashboardError::conflict("Username already exists."));
        }
        if let Some(email) = &email {
            if db.find_user_by_email(email).await?.is_some() {
                return Err(DashboardError::conflict("Email already in use."));
            }
        }

        let user = db
            .create_user(NewUser {
                username: username.to_string(),
                email,
                password_hash: hash_password(password)?,
                role: role.as_str().to_string(),
            })
            .await?;

        info!("Registered user {} with role {}", user.username, role);
        Ok(UserInfo::from(&user))
    }

    /// Issue a bearer token; the expiry is also reported in the client's `zone`
    pub async fn login(
        &self,
        request: LoginRequest,
        zone: &ClientZone,
    ) -> Result<LoginResponse> {
        let (Some(username), Some(password)) = (field(&request.username), field(&request.password))
        else {
            return Err(DashboardError::bad_request("Missing credentials"));
        };

        let user = self
            .storage
            .db()
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| DashboardError::invalid_credentials("User not found"))?;

        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for user {}", username);
            return Err(DashboardError::invalid_credentials("Invalid password"));
        }

        let info = UserInfo::from(&user);
        let (token, exp) = self.jwt.create_token(&info.username, info.role.as_str())?;
        let expires = DateTime::<Utc>::from_timestamp(exp as i64, 0).unwrap_or_else(Utc::now);

        info!("User {} logged in", info.username);
        Ok(LoginResponse {
            token,
            user: info,
            expires_at: expires.to_rfc3339_opts(SecondsFormat::Secs, true),
            expires_at_local: zone.format(expires),
            client_tz: zone.name().to_string(),
        })
    }

    /// Resolve a bearer token to its account
    pub async fn authenticate(&self, token: &str) -> Result<UserInfo> {
        let claims = self
            .jwt
            .verify_token(token)
            .map_err(|e| DashboardError::unauthorized(e.to_string()))?;

        let user = self
            .storage
            .db()
            .find_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| DashboardError::unauthorized("Unknown user"))?;

        Ok(UserInfo::from(&user))
    }

    /// Issue a reset token when the account exists
    ///
    /// Returns `None` for unknown accounts so callers can answer identically either way.
    pub async fn request_password_reset(
        &self,
        request: ForgotPasswordRequest,
    ) -> Result<Option<String>> {
        let db = self.storage.db();
        let user = match (field(&request.username), field(&request.email)) {
            (Some(username), _) => db.find_user_by_username(username).await?,
            (None, Some(email)) => db.find_user_by_email(email).await?,
            (None, None) => None,
        };

        let Some(user) = user else {
            debug!("Password reset requested for unknown account");
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::seconds(self.config.reset_token_ttl as i64);
        db.store_password_reset_token(&user.username, &token, expires_at)
            .await?;

        info!("Password reset token issued for user {}", user.username);
        Ok(Some(token))
    }

    /// Consume a reset token and set the new password
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<()> {
        let (Some(token), Some(new_password)) =
            (field(&request.token), field(&request.new_password))
        else {
            return Err(DashboardError::bad_request(
                "Token and new password are required.",
            ));
        };

        let db = self.storage.db();
        let record = db
            .find_password_reset_token(token)
            .await?
            .ok_or_else(|| DashboardError::bad_request("Invalid or expired token."))?;

        if record.is_expired(Utc::now()) {
            db.delete_password_reset_token(token).await?;
            return Err(DashboardError::bad_request("Invalid or expired token."));
        }

        if db.find_user_by_username(&record.username).await?.is_none() {
            return Err(DashboardError::not_found("User not found."));
        }

        db.update_user_password(&record.username, &hash_password(new_password)?)
            .await?;
        db.delete_password_reset_token(token).await?;

        info!("Password reset for user {}", record.username);
        Ok(())
    }
}
