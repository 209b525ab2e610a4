//! Shared utilities for the HTTP-backed adapters
//!
//! HTTP client construction, vendor status mapping and the date windows every
//! cost query is expressed in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::providers::unified_provider::ProviderError;

// ============================================================================
// HTTP Client
// ============================================================================

/// Default timeout for vendor API calls
pub const DEFAULT_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub fn build_http_client(
    provider: &'static str,
    timeout: std::time::Duration,
) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("multicloud-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Configuration {
            provider,
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// Pass successful responses through, map everything else to a [`ProviderError`]
pub async fn ensure_success(
    provider: &'static str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(status_to_error(provider, status, error_text))
}

fn status_to_error(provider: &'static str, status: StatusCode, error_text: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::Authentication {
            provider,
            message: format!("Authorization failed ({}): {}", status, error_text),
        },
        code => ProviderError::api_error(provider, code, error_text),
    }
}

// ============================================================================
// OAuth tokens
// ============================================================================

/// Bearer token with expiration
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn expiring_in(token: impl Into<String>, seconds: i64) -> Self {
        Self {
            token: token.into(),
            expires_at: Utc::now() + Duration::seconds(seconds),
        }
    }

    /// Expired, or within five minutes of expiring
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::minutes(5)
    }
}

/// Access tokens keyed by credential, shared by every adapter one factory builds
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token stored under `key`, unless it is about to expire
    pub async fn get(&self, key: &str) -> Option<String> {
        self.tokens
            .read()
            .await
            .get(key)
            .filter(|token| !token.is_expired())
            .map(|token| token.token.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, token: AccessToken) {
        self.tokens.write().await.insert(key.into(), token);
    }
}

/// Standard OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

// ============================================================================
// Date windows
// ============================================================================

/// First day of the month containing `today`
pub fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Last day of the month containing `today`
pub fn month_end(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(today)
}

pub fn days_in_month(today: NaiveDate) -> u32 {
    month_end(today).day()
}

/// Longest day window, trailing or forward, any adapter will compute
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Reject day windows longer than [`MAX_WINDOW_DAYS`]
pub fn check_window(provider: &'static str, days: u32) -> Result<(), ProviderError> {
    if days > MAX_WINDOW_DAYS {
        return Err(ProviderError::invalid_request(
            provider,
            format!("days must be at most {}", MAX_WINDOW_DAYS),
        ));
    }
    Ok(())
}

/// `date` shifted by `days`, `None` outside the calendar range
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Inclusive `(start, end)` covering the trailing `days` up to and including `today`
pub fn trailing_window(
    provider: &'static str,
    today: NaiveDate,
    days: u32,
) -> Result<(NaiveDate, NaiveDate), ProviderError> {
    check_window(provider, days)?;
    let span = i64::from(days.max(1)) - 1;
    let start = shift_days(today, -span).ok_or_else(|| {
        ProviderError::invalid_request(
            provider,
            format!("{} days before {} is out of range", days, today),
        )
    })?;
    Ok((start, today))
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
