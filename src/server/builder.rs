//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{DashboardError, Result};
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| DashboardError::config("Configuration is required"))?;

        HttpServer::new(&config).await
    }
}

/// Build and run the server until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting multi-cloud dashboard API");

    let server = ServerBuilder::new().with_config(config).build().await?;
    let server_config = server.config();
    info!(
        "Server starting at: http://{}:{}",
        server_config.host, server_config.port
    );
    info!("   GET  /api/health - Health check");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/providers - Active providers");

    server.start().await
}
