//! Authentication flows against a migrated in-memory database

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::fixtures::TEST_JWT_SECRET;
    use crate::{assert_err, assert_ok};
    use chrono::{Duration, Utc};
    use multicloud_dashboard::DashboardError;
    use multicloud_dashboard::auth::{
        AuthSystem, ClientZone, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
        Role,
    };
    use multicloud_dashboard::config::AuthConfig;

    async fn auth_system() -> AuthSystem {
        let config = AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            ..AuthConfig::default()
        };
        AuthSystem::new(&config, TestDatabase::new().await.storage())
    }

    fn register_request(username: &str, password: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            email: Some(format!("{}@example.com", username)),
            role: role.map(str::to_string),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_first_admin_only() {
        let auth = auth_system().await;

        let first = assert_ok!(auth.register(register_request("alice", "pw1", Some("admin"))).await);
        assert_eq!(first.role, Role::Admin);

        let second = assert_ok!(auth.register(register_request("bob", "pw2", Some("admin"))).await);
        assert_eq!(second.role, Role::Viewer);

        let default = assert_ok!(auth.register(register_request("carol", "pw3", None)).await);
        assert_eq!(default.role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_register_conflicts_and_validation() {
        let auth = auth_system().await;
        assert_ok!(auth.register(register_request("alice", "pw", None)).await);

        let err = assert_err!(auth.register(register_request("alice", "other", None)).await);
        assert!(matches!(err, DashboardError::Conflict(_)));
        assert_eq!(err.to_string(), "Username already exists.");

        let mut same_email = register_request("alicia", "pw", None);
        same_email.email = Some("alice@example.com".into());
        let err = assert_err!(auth.register(same_email).await);
        assert_eq!(err.to_string(), "Email already in use.");

        let blank = RegisterRequest {
            username: Some("   ".into()),
            password: Some("pw".into()),
            ..RegisterRequest::default()
        };
        let err = assert_err!(auth.register(blank).await);
        assert_eq!(err.to_string(), "Username and password are required.");
    }

    #[tokio::test]
    async fn test_login_reports_expiry_in_client_zone() {
        let auth = auth_system().await;
        assert_ok!(auth.register(register_request("alice", "s3cret", None)).await);

        let zone = ClientZone::resolve([Some("Asia/Kolkata")]);
        let response = assert_ok!(auth.login(login_request("alice", "s3cret"), &zone).await);
        assert_eq!(response.client_tz, "Asia/Kolkata");
        assert!(response.expires_at_local.ends_with("+05:30"));

        let utc = chrono::DateTime::parse_from_rfc3339(&response.expires_at).unwrap();
        let local = chrono::DateTime::parse_from_rfc3339(&response.expires_at_local).unwrap();
        assert_eq!(utc, local);
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let auth = auth_system().await;
        assert_ok!(auth.register(register_request("alice", "s3cret", Some("admin"))).await);

        let err = assert_err!(auth.login(login_request("nobody", "x"), &ClientZone::utc()).await);
        assert_eq!(err.to_string(), "User not found");
        let err = assert_err!(auth.login(login_request("alice", "wrong"), &ClientZone::utc()).await);
        assert_eq!(err.to_string(), "Invalid password");
        let err = assert_err!(auth.login(LoginRequest::default(), &ClientZone::utc()).await);
        assert_eq!(err.to_string(), "Missing credentials");

        let response = assert_ok!(auth.login(login_request("alice", "s3cret"), &ClientZone::utc()).await);
        assert_eq!(response.user.username, "alice");
        assert!(response.expires_at.ends_with('Z'));
        assert_eq!(response.client_tz, "UTC");
        assert!(response.expires_at_local.ends_with("+00:00"));

        let user = assert_ok!(auth.authenticate(&response.token).await);
        assert_eq!(user.role, Role::Admin);

        let err = assert_err!(auth.authenticate("not-a-token").await);
        assert!(matches!(err, DashboardError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let auth = auth_system().await;
        assert_ok!(auth.register(register_request("alice", "old-pw", None)).await);

        let unknown = assert_ok!(
            auth.request_password_reset(ForgotPasswordRequest {
                username: Some("ghost".into()),
                email: None,
            })
            .await
        );
        assert!(unknown.is_none());

        let first = assert_ok!(
            auth.request_password_reset(ForgotPasswordRequest {
                username: None,
                email: Some("alice@example.com".into()),
            })
            .await
        )
        .unwrap();
        let token = assert_ok!(
            auth.request_password_reset(ForgotPasswordRequest {
                username: Some("alice".into()),
                email: None,
            })
            .await
        )
        .unwrap();
        assert_ne!(first, token);

        // A newer request replaces older tokens
        let err = assert_err!(
            auth.reset_password(ResetPasswordRequest {
                token: Some(first),
                new_password: Some("new-pw".into()),
            })
            .await
        );
        assert_eq!(err.to_string(), "Invalid or expired token.");

        assert_ok!(
            auth.reset_password(ResetPasswordRequest {
                token: Some(token.clone()),
                new_password: Some("new-pw".into()),
            })
            .await
        );
        assert_ok!(auth.login(login_request("alice", "new-pw"), &ClientZone::utc()).await);
        assert_err!(auth.login(login_request("alice", "old-pw"), &ClientZone::utc()).await);

        // Single use
        let err = assert_err!(
            auth.reset_password(ResetPasswordRequest {
                token: Some(token),
                new_password: Some("again".into()),
            })
            .await
        );
        assert_eq!(err.to_string(), "Invalid or expired token.");
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_deleted() {
        let db = TestDatabase::new().await;
        let storage = db.storage();
        let config = AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            ..AuthConfig::default()
        };
        let auth = AuthSystem::new(&config, storage.clone());
        assert_ok!(auth.register(register_request("alice", "pw", None)).await);

        storage
            .db()
            .store_password_reset_token("alice", "stale-token", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        let err = assert_err!(
            auth.reset_password(ResetPasswordRequest {
                token: Some("stale-token".into()),
                new_password: Some("new".into()),
            })
            .await
        );
        assert_eq!(err.to_string(), "Invalid or expired token.");
        assert!(
            storage
                .db()
                .find_password_reset_token("stale-token")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_reset_for_deleted_user() {
        let db = TestDatabase::new().await;
        let storage = db.storage();
        let auth = AuthSystem::new(
            &AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
                ..AuthConfig::default()
            },
            storage.clone(),
        );

        storage
            .db()
            .store_password_reset_token("ghost", "orphan", Utc::now() + Duration::minutes(5))
            .await
            .unwrap();

        let err = assert_err!(
            auth.reset_password(ResetPasswordRequest {
                token: Some("orphan".into()),
                new_password: Some("new".into()),
            })
            .await
        );
        assert!(matches!(err, DashboardError::NotFound(_)));
        assert_eq!(err.to_string(), "User not found.");
    }
}
