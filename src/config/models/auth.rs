//! Authentication configuration

use super::*;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret; a random one is generated when absent
    #[serde(default = "generate_secure_jwt_secret")]
    pub jwt_secret: String,
    /// JWT lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,
    /// Password reset token lifetime in seconds
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl: u64,
    /// Return reset tokens in the forgot-password response
    #[serde(default)]
    pub expose_reset_token: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_secure_jwt_secret(),
            jwt_expiration: default_jwt_expiration(),
            reset_token_ttl: default_reset_token_ttl(),
            expose_reset_token: false,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration < 300 {
            return Err("JWT expiration should be at least 5 minutes (300 seconds)".to_string());
        }

        if self.jwt_expiration > 86400 * 30 {
            return Err("JWT expiration should not exceed 30 days".to_string());
        }

        if self.reset_token_ttl == 0 {
            return Err("Reset token lifetime cannot be 0".to_string());
        }

        Ok(())
    }
}

/// Generate a 64-character random JWT secret
fn generate_secure_jwt_secret() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_secret_is_random_and_valid() {
        let a = AuthConfig::default();
        let b = AuthConfig::default();
        assert_eq!(a.jwt_secret.len(), 64);
        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert!(a.validate().is_ok());
        assert_eq!(a.jwt_expiration, 28800);
        assert_eq!(a.reset_token_ttl, 1800);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig {
            jwt_secret: "short".into(),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
