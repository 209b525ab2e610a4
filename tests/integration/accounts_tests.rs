//! Account discovery across environment, accounts file and YAML config

#[cfg(test)]
mod tests {
    use crate::common::env_from;
    use multicloud_dashboard::config::{CloudAccountConfig, CloudConfig};
    use multicloud_dashboard::core::aggregation::ProviderDirectory;
    use multicloud_dashboard::core::providers::ProviderSettings;
    use multicloud_dashboard::services::CloudAccountManager;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn accounts_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_sources_layer_in_order() {
        let file = accounts_file(
            r#"{
                "AWS": {"region": "eu-west-1"},
                "azure": {"subscription_id": "sub-1", "enabled": false},
                "mock_gcp": {}
            }"#,
        );

        let config = CloudConfig {
            accounts_file: file.path().display().to_string(),
            accounts: vec![CloudAccountConfig {
                name: "gcp".into(),
                enabled: true,
                settings: ProviderSettings::new().with("project_id", "proj-9"),
            }],
            ..CloudConfig::default()
        };
        let env = env_from(&[
            ("AWS_ACCOUNT_ID", "111122223333"),
            ("AZURE_SUBSCRIPTION_ID", "sub-env"),
        ]);

        let manager = CloudAccountManager::load(&config, env).await.unwrap();

        assert_eq!(manager.ids(), ["aws", "gcp", "mock_gcp"]);
        let aws = manager.config("aws").unwrap();
        assert_eq!(aws.get_str("account_id"), Some("111122223333"));
        assert_eq!(aws.get_str("region"), Some("eu-west-1"));
        assert!(!manager.is_provider_configured("azure"));
        assert_eq!(
            manager.config("GCP").unwrap().get_str("project_id"),
            Some("proj-9")
        );

        let active = serde_json::to_value(manager.active_providers()).unwrap();
        assert_eq!(
            active[0],
            serde_json::json!({"name": "aws", "status": "configured"})
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_an_error() {
        let config = CloudConfig {
            accounts_file: "/definitely/missing/clouds.json".into(),
            ..CloudConfig::default()
        };
        let manager = CloudAccountManager::load(&config, env_from(&[]))
            .await
            .unwrap();
        assert!(manager.is_empty());
        assert!(manager.active_providers().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_config_error() {
        let file = accounts_file("[1, 2, 3]");
        let config = CloudConfig {
            accounts_file: file.path().display().to_string(),
            ..CloudConfig::default()
        };
        let err = CloudAccountManager::load(&config, env_from(&[]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid accounts file"));
    }
}
