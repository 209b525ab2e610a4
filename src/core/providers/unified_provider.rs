//! Unified provider error handling
//!
//! Single error type shared by every cloud adapter, the factory and the aggregation layer.
//!
//! | Variant | Raised by | HTTP status |
//! |------|------|------------|
//! | Configuration | adapter construction | 500 |
//! | UnsupportedProvider | factory lookup | 500 |
//! | NotConfigured | account directory lookup | 404 |
//! | Authentication | credential acquisition | 500 |
//! | Network / Timeout | outbound vendor calls | 500 |
//! | ApiError | vendor returned a non-success status | 500 |
//! | ResponseParsing | vendor payload did not match the expected shape | 500 |
//! | InvalidRequest | caller input outside what an adapter will query | 400 |
//!
//! ```rust,ignore
//! let err = ProviderError::configuration("aws", "AWS account_id required");
//! assert_eq!(err.to_string(), "AWS account_id required");
//! ```

/// Unified provider error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("{message}")]
    Configuration {
        provider: &'static str,
        message: String,
    },

    #[error("Unsupported provider: {name}")]
    UnsupportedProvider { name: String },

    #[error("{name} not configured")]
    NotConfigured { name: String },

    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: &'static str,
        message: String,
    },

    #[error("Network error for {provider}: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },

    /// API error with status code
    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} error: {message}")]
    Other {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Create configuration error
    pub fn configuration(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
        }
    }

    /// Create unsupported provider error
    pub fn unsupported_provider(name: impl Into<String>) -> Self {
        Self::UnsupportedProvider { name: name.into() }
    }

    /// Create not configured error
    pub fn not_configured(name: impl Into<String>) -> Self {
        Self::NotConfigured { name: name.into() }
    }

    /// Create authentication error
    pub fn authentication(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    /// Create network error
    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    /// Create API error
    pub fn api_error(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Create response parsing error
    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider,
            message: message.into(),
        }
    }

    /// Create invalid request error
    pub fn invalid_request(provider: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider,
            message: message.into(),
        }
    }

    /// Create other error
    pub fn other(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Other {
            provider,
            message: message.into(),
        }
    }

    /// Map a reqwest transport error
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else if err.is_decode() {
            Self::response_parsing(provider, err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Provider kind the error originated from, when known
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::Configuration { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::Other { provider, .. } => Some(provider),
            Self::UnsupportedProvider { .. } | Self::NotConfigured { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ProviderError::unsupported_provider("oracle").to_string(),
            "Unsupported provider: oracle"
        );
        assert_eq!(
            ProviderError::not_configured("azure").to_string(),
            "azure not configured"
        );
        assert_eq!(
            ProviderError::configuration("azure", "Azure subscription_id required").to_string(),
            "Azure subscription_id required"
        );
    }

    #[test]
    fn test_provider_accessor() {
        assert_eq!(ProviderError::timeout("gcp", "slow").provider(), Some("gcp"));
        assert_eq!(ProviderError::not_configured("gcp").provider(), None);
    }

    #[test]
    fn test_api_error_keeps_status() {
        let err = ProviderError::api_error("azure", 429, "Too many requests");
        assert_eq!(
            err.to_string(),
            "API error for azure (status 429): Too many requests"
        );
        assert!(matches!(err, ProviderError::ApiError { status: 429, .. }));
    }
}
