//! Error handling for the dashboard
//!
//! This module defines the application error type and its HTTP mapping.

#![allow(missing_docs)]

use crate::core::providers::unified_provider::ProviderError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the dashboard
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider errors
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthorized(String),

    /// Login rejected with a caller-visible reason
    #[error("{0}")]
    InvalidCredentials(String),

    /// Authenticated but not allowed
    #[error("Forbidden")]
    Forbidden(String),

    /// Validation errors
    #[error("{0}")]
    Validation(String),

    /// Bad request errors
    #[error("{0}")]
    BadRequest(String),

    /// Not found errors
    #[error("{0}")]
    NotFound(String),

    /// Conflict errors
    #[error("{0}")]
    Conflict(String),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal server errors
    #[error("{0}")]
    Internal(String),
}

impl DashboardError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials(message.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Unauthorized(_)
            | DashboardError::InvalidCredentials(_)
            | DashboardError::Jwt(_) => StatusCode::UNAUTHORIZED,
            DashboardError::Forbidden(_) => StatusCode::FORBIDDEN,
            DashboardError::Validation(_) | DashboardError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Conflict(_) => StatusCode::CONFLICT,
            DashboardError::Provider(ProviderError::NotConfigured { .. }) => StatusCode::NOT_FOUND,
            DashboardError::Provider(ProviderError::InvalidRequest { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DashboardError::Jwt(_) => "Unauthorized".to_string(),
            DashboardError::Database(_) => "Database operation failed".to_string(),
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { error: message })
    }
}

/// Standard error response body
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
