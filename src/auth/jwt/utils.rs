//! JWT utility functions

use super::types::JwtHandler;
use crate::utils::error::{DashboardError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

impl JwtHandler {
    /// Token from an `Authorization: Bearer <token>` header value
    pub fn extract_token_from_header(header_value: &str) -> Option<&str> {
        let (scheme, token) = header_value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    pub(super) fn now() -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| DashboardError::internal(format!("System time error: {}", e)))
    }
}
