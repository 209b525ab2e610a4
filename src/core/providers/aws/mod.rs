//! Amazon Web Services adapter
//!
//! Costs come from Cost Explorer, metrics from CloudWatch. The SDK clients are
//! only compiled with the `aws` feature.

pub mod config;
#[cfg(feature = "aws")]
pub mod provider;

pub use config::AwsConfig;
#[cfg(feature = "aws")]
pub use provider::AwsProvider;

use super::{CloudProvider, ProviderError, ProviderResult, ProviderSettings};

/// Build the AWS adapter, or explain why it is unavailable in this build
pub fn create(settings: &ProviderSettings) -> ProviderResult<Box<dyn CloudProvider>> {
    let config: AwsConfig = settings.parse()?;

    #[cfg(feature = "aws")]
    {
        Ok(Box::new(AwsProvider::new(config)))
    }

    #[cfg(not(feature = "aws"))]
    {
        let _ = config;
        Err(ProviderError::configuration(
            "aws",
            "AWS support not compiled in (enable the `aws` feature)",
        ))
    }
}

/// Month-to-date and daily cost metric
pub const COST_METRIC: &str = "UnblendedCost";

#[cfg_attr(not(feature = "aws"), allow(dead_code))]
pub(crate) fn sdk_error(context: &str, err: impl std::error::Error + 'static) -> ProviderError {
    ProviderError::other("aws", format!("{}: {}", context, display_chain(&err)))
}

#[cfg_attr(not(feature = "aws"), allow(dead_code))]
fn display_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validates_before_sdk() {
        let err = create(&ProviderSettings::new()).unwrap_err();
        assert_eq!(err.to_string(), "AWS account_id required");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_sdk_error_includes_sources() {
        let err = sdk_error(
            "GetCostAndUsage",
            Outer(std::io::Error::other("access denied")),
        );
        assert!(err.to_string().contains("GetCostAndUsage: outer: access denied"));
    }
}
