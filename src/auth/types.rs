//! Authentication request and response types

use crate::storage::database::entities::user;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }

    /// Case-insensitive parse; unknown names yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
}

impl From<&user::Model> for UserInfo {
    fn from(model: &user::Model) -> Self {
        Self {
            username: model.username.clone(),
            role: Role::parse(&model.role).unwrap_or(Role::Viewer),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Requested role; `admin` is granted only while no admin exists
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    /// RFC 3339, UTC
    pub expires_at: String,
    /// `expires_at` in the client's time zone
    pub expires_at_local: String,
    /// IANA name of the zone `expires_at_local` is expressed in
    pub client_tz: String,
}

/// Time zone the client asked to see timestamps in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientZone(Tz);

impl ClientZone {
    pub fn utc() -> Self {
        Self(Tz::UTC)
    }

    /// First non-blank candidate that names an IANA zone; unknown names fall back to UTC
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let Some(name) = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
        else {
            return Self::utc();
        };

        match name.parse::<Tz>() {
            Ok(tz) => Self(tz),
            Err(_) => {
                debug!(tz = %name, "Unknown client time zone, using UTC");
                Self::utc()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// RFC 3339 with the zone's offset at that instant
    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.0)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl Default for ClientZone {
    fn default() -> Self {
        Self::utc()
    }
}

/// Either field identifies the account; username wins when both are set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Trimmed value, `None` when missing or blank
pub(crate) fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
