//! HTTP server core implementation

use crate::auth::AuthSystem;
use crate::config::{Config, CorsConfig, ServerConfig};
use crate::core::aggregation::Aggregator;
use crate::core::providers::ProviderFactory;
use crate::server::routes;
use crate::server::state::AppState;
use crate::services::CloudAccountManager;
use crate::storage::StorageLayer;
use crate::utils::error::{DashboardError, Result};
use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::DefaultHeaders,
    web,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server from the loaded configuration
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        let state = Self::build_state(config, |key| std::env::var(key).ok()).await?;
        Ok(Self {
            config: config.server().clone(),
            state,
        })
    }

    /// Connect storage, load cloud accounts and assemble the shared state
    pub async fn build_state<F>(config: &Config, env: F) -> Result<AppState>
    where
        F: Fn(&str) -> Option<String>,
    {
        let factory = ProviderFactory::new(config.cloud().use_mock_data);
        Self::build_state_with_factory(config, env, factory).await
    }

    /// Same as [`HttpServer::build_state`] with a caller-supplied provider registry
    pub async fn build_state_with_factory<F>(
        config: &Config,
        env: F,
        factory: ProviderFactory,
    ) -> Result<AppState>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = Arc::new(StorageLayer::new(config.storage()).await?);
        let auth = AuthSystem::new(config.auth(), Arc::clone(&storage));

        let accounts = CloudAccountManager::load(config.cloud(), env).await?;
        if factory.is_mock_mode() {
            info!("Mock mode enabled, every provider serves sample data");
        }
        let aggregator = Aggregator::new(
            Arc::new(factory),
            Arc::new(accounts),
            config.cloud().aggregation.clone(),
        );

        Ok(AppState::new(config.clone(), auth, aggregator, storage))
    }

    fn build_cors(cors_config: &CorsConfig) -> Cors {
        let mut cors = Cors::default();
        if !cors_config.enabled {
            return cors;
        }

        if cors_config.allows_all_origins() {
            cors = cors.allow_any_origin();
            cors_config.validate().unwrap_or_else(|e| {
                warn!(error = %e, "CORS Configuration Warning");
            });
        } else {
            for origin in &cors_config.allowed_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        let methods: Vec<actix_web::http::Method> = cors_config
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        if !methods.is_empty() {
            cors = cors.allowed_methods(methods);
        }

        let headers: Vec<actix_web::http::header::HeaderName> = cors_config
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if !headers.is_empty() {
            cors = cors.allowed_headers(headers);
        }

        cors = cors.max_age(cors_config.max_age as usize);
        if cors_config.allow_credentials {
            cors = cors.supports_credentials();
        }
        cors
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let cors = Self::build_cors(&state.config.server().cors);

        App::new()
            .app_data(state)
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "multi-cloud-dashboard")))
            .configure(routes::configure_routes)
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let workers = self.config.worker_count();

        info!("Starting HTTP server on {} with {} workers", bind_addr, workers);

        let state = web::Data::new(self.state);
        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .bind(&bind_addr)
            .map_err(|e| DashboardError::internal(format!("Failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| DashboardError::internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
