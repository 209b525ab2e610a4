//! Core JWT handler implementation

use super::types::{Claims, JwtHandler};
use crate::config::AuthConfig;
use crate::utils::error::{DashboardError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};

impl JwtHandler {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            expiration: config.jwt_expiration,
        }
    }

    /// Issue a token for `username`, returning it with its expiry timestamp
    pub fn create_token(&self, username: &str, role: &str) -> Result<(String, u64)> {
        let now = Self::now()?;
        let claims = Claims {
            sub: username.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.expiration,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(DashboardError::Jwt)?;

        debug!("Created access token for user: {}", username);
        Ok((token, claims.exp))
    }

    /// Verify signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT verification failed: {}", e);
            DashboardError::Jwt(e)
        })?;

        Ok(token_data.claims)
    }
}
