//! HTTP surface in mock mode

#[cfg(test)]
mod tests {
    use crate::common::{env_from, mock_config};
    use actix_web::body::MessageBody;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{test, web};
    use async_trait::async_trait;
    use multicloud_dashboard::config::CloudAccountConfig;
    use multicloud_dashboard::core::providers::{ProviderResult, ProviderSettings};
    use multicloud_dashboard::core::types::{
        Anomaly, CostLineItem, DailyCostPoint, MetricSnapshot, Outcome, TimeseriesSeries,
    };
    use multicloud_dashboard::server::HttpServer;
    use multicloud_dashboard::{CloudProvider, ProviderError, ProviderFactory};
    use serde_json::{Value, json};

    macro_rules! mock_app {
        () => {{
            let env = env_from(&[
                ("AWS_ACCOUNT_ID", "111122223333"),
                ("GCP_PROJECT_ID", "demo-project"),
            ]);
            let state = HttpServer::build_state(&mock_config(), env).await.unwrap();
            test::init_service(HttpServer::create_app(web::Data::new(state))).await
        }};
    }

    macro_rules! call {
        ($app:expr, $req:expr $(,)?) => {
            json_of(test::call_service(&$app, $req.to_request()).await).await
        };
    }

    /// Register an admin and return a bearer token for it
    macro_rules! login_token {
        ($app:expr, $username:expr) => {{
            let (status, _) = call!(
                $app,
                test::TestRequest::post()
                    .uri("/api/auth/register")
                    .set_json(json!({"username": $username, "password": "pw", "role": "admin"}))
            );
            assert_eq!(status, StatusCode::CREATED);

            let (status, body) = call!(
                $app,
                test::TestRequest::post()
                    .uri("/api/auth/login")
                    .set_json(json!({"username": $username, "password": "pw"}))
            );
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }};
    }

    async fn json_of<B: MessageBody>(response: ServiceResponse<B>) -> (StatusCode, Value) {
        let status = response.status();
        let body = test::read_body(response).await;
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str, token: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
    }

    #[actix_web::test]
    async fn test_health_and_index() {
        let app = mock_app!();

        let (status, body) = call!(app, test::TestRequest::get().uri("/api/health"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "service": "multi-cloud-dashboard"}));

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = test::read_body(response).await;
        assert!(std::str::from_utf8(&html).unwrap().contains("/api/health"));
    }

    #[actix_web::test]
    async fn test_protected_routes_require_bearer() {
        let app = mock_app!();

        let (status, body) = call!(app, test::TestRequest::get().uri("/api/providers"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Unauthorized"}));

        let (status, _) = call!(app, get("/api/costs/summary", "garbage"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_auth_round_trip() {
        let app = mock_app!();
        let token = login_token!(app, "alice");

        let (status, body) = call!(app, get("/api/auth/me", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"user": {"username": "alice", "role": "admin"}}));

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/logout")
                .insert_header((AUTHORIZATION, format!("Bearer {}", token))),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({"username": "alice"})),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing credentials");
    }

    #[actix_web::test]
    async fn test_forgot_and_reset_over_http() {
        let app = mock_app!();
        login_token!(app, "alice");

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/forgot")
                .set_json(json!({"username": "nobody"})),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "message": "If the account exists, we sent instructions."})
        );

        let (_, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/forgot")
                .set_json(json!({"username": "alice"})),
        );
        let reset_token = body["reset_token"].as_str().unwrap().to_string();

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/reset")
                .set_json(json!({"token": reset_token, "new_password": "fresh"})),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password has been reset.");

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/reset")
                .set_json(json!({"token": ""})),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Token and new password are required.");
    }

    #[actix_web::test]
    async fn test_provider_routes() {
        let app = mock_app!();
        let token = login_token!(app, "alice");

        let (status, body) = call!(app, get("/api/providers", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"name": "aws", "status": "configured"},
                {"name": "gcp", "status": "configured"}
            ])
        );

        let (status, body) = call!(app, get("/api/aws/costs/daily?days=3", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) = call!(app, get("/api/gcp/metrics/timeseries?minutes=5", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ts"].as_array().unwrap().len(), 5);
        assert_eq!(body["cpu_percent"].as_array().unwrap().len(), 5);

        let (status, body) = call!(app, get("/api/azure/costs/mtd", &token));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "azure not configured"}));

        let (status, body) = call!(app, get("/api/aws/forecast?days=abc", &token));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid query"));

        let (status, body) = call!(app, get("/api/aws/services/breakdown", &token));
        assert_eq!(status, StatusCode::OK);
        assert!(body["total_services"].as_u64().unwrap() > 0);
    }

    #[actix_web::test]
    async fn test_aggregate_routes() {
        let app = mock_app!();
        let token = login_token!(app, "alice");

        let (status, body) = call!(app, get("/api/costs/summary", &token));
        assert_eq!(status, StatusCode::OK);
        let summary = body.as_array().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0]["provider"], "aws");
        assert_eq!(summary[0]["status"], "active");

        let (status, body) = call!(app, get("/api/forecast/all", &token));
        assert_eq!(status, StatusCode::OK);
        assert!(body["providers"]["aws"]["projected_eom"].is_number());
        assert!(body["total_projected_eom"].is_number());

        let (status, body) = call!(app, get("/api/budgets/all", &token));
        assert_eq!(status, StatusCode::OK);
        assert!(body["at_risk_count"].is_number());
        assert!(
            body["budgets"]
                .as_array()
                .unwrap()
                .iter()
                .all(|b| b["provider"].is_string())
        );

        for uri in [
            "/api/anomalies/all",
            "/api/recommendations/all",
            "/api/alerts/all",
            "/api/services/breakdown/all",
        ] {
            let (status, _) = call!(app, get(uri, &token));
            assert_eq!(status, StatusCode::OK, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_login_reports_client_zone() {
        let app = mock_app!();
        login_token!(app, "alice");
        let credentials = json!({"username": "alice", "password": "pw"});

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(("X-Timezone", "Asia/Tokyo"))
                .set_json(&credentials)
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["client_tz"], "Asia/Tokyo");
        assert!(body["expires_at_local"].as_str().unwrap().ends_with("+09:00"));
        assert!(body["expires_at"].as_str().unwrap().ends_with('Z'));

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login?tz=Bad/Zone")
                .set_json(&credentials)
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["client_tz"], "UTC");

        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(&credentials)
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["client_tz"], "UTC");
        assert!(body["expires_at_local"].as_str().unwrap().ends_with("+00:00"));
    }

    #[actix_web::test]
    async fn test_day_windows_outside_range_are_rejected() {
        let app = mock_app!();
        let token = login_token!(app, "alice");

        for uri in [
            "/api/aws/costs/daily?days=0",
            "/api/aws/costs/daily?days=4000000000",
            "/api/aws/forecast?days=367",
            "/api/gcp/forecast?days=4000000000",
            "/api/forecast/all?days=4000000000",
        ] {
            let (status, body) = call!(app, get(uri, &token));
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            let message = body["error"].as_str().unwrap();
            assert!(message.starts_with("Invalid query parameters"), "{}", uri);
            assert!(message.contains("days must be between 1 and 366"), "{}", uri);
        }

        let (status, body) = call!(app, get("/api/aws/costs/daily?days=366", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 366);

        let (status, body) = call!(app, get("/api/aws/forecast?days=366", &token));
        assert_eq!(status, StatusCode::OK);
        assert!(body["projected_eom"].is_number());
    }

    #[actix_web::test]
    async fn test_unconfigured_provider_extension_routes() {
        let app = mock_app!();
        let token = login_token!(app, "alice");

        for uri in [
            "/api/azure/anomalies",
            "/api/azure/forecast",
            "/api/azure/recommendations",
            "/api/azure/alerts",
            "/api/azure/budgets",
            "/api/azure/services/breakdown",
            "/api/azure/costs/daily",
        ] {
            let (status, body) = call!(app, get(uri, &token));
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body, json!({"error": "azure not configured"}), "{}", uri);
        }
    }

    /// Adapter whose insight calls fail upstream
    #[derive(Debug)]
    struct FlakyProvider;

    #[async_trait]
    impl CloudProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn month_to_date_costs(&self) -> Outcome<Vec<CostLineItem>> {
            Outcome::Data(vec![CostLineItem::new("Compute", 12.5)])
        }

        async fn daily_costs(&self, _days: u32) -> Outcome<Vec<DailyCostPoint>> {
            Outcome::Data(Vec::new())
        }

        async fn live_metrics(&self) -> MetricSnapshot {
            MetricSnapshot::new(0.0, 0)
        }

        async fn timeseries(&self, metric: &str, _minutes: u32) -> TimeseriesSeries {
            TimeseriesSeries::empty(metric)
        }

        async fn anomalies(&self) -> ProviderResult<Vec<Anomaly>> {
            Err(ProviderError::api_error("flaky", 503, "upstream unavailable"))
        }
    }

    #[actix_web::test]
    async fn test_adapter_errors_surface_as_500() {
        let mut config = mock_config();
        config.dashboard.cloud.use_mock_data = false;
        config.dashboard.cloud.accounts = vec![CloudAccountConfig {
            name: "flaky".to_string(),
            enabled: true,
            settings: ProviderSettings::new(),
        }];

        let mut factory = ProviderFactory::empty(false);
        factory.register("flaky", |_settings: &ProviderSettings| {
            Ok(Box::new(FlakyProvider) as Box<dyn CloudProvider>)
        });

        let state = HttpServer::build_state_with_factory(&config, env_from(&[]), factory)
            .await
            .unwrap();
        let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;
        let token = login_token!(app, "alice");

        let (status, body) = call!(app, get("/api/flaky/anomalies", &token));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "API error for flaky (status 503): upstream unavailable"})
        );

        let (status, body) = call!(app, get("/api/flaky/services/breakdown", &token));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_services"], 1);
    }
}
