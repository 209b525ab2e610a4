//! # Multi-Cloud Dashboard
//!
//! Backend for a cost and metrics dashboard spanning AWS, Azure and GCP.
//!
//! ## Features
//!
//! - **Unified provider contract**: every cloud answers the same cost, metric and insight
//!   queries through [`core::providers::CloudProvider`]
//! - **Mock mode**: deterministic sample data for every provider id
//! - **Partial-failure aggregation**: one broken cloud never fails a cross-provider view
//! - **Accounts and roles**: registration, JWT login and password reset over SQLite or
//!   PostgreSQL
//!
//! ## Running the API
//!
//! ```rust,no_run
//! use multicloud_dashboard::{Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config/dashboard.yaml").await?;
//!     Dashboard::new(config).await?.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use core::aggregation::Aggregator;
pub use core::providers::{CloudProvider, ProviderError, ProviderFactory};
pub use utils::error::{DashboardError, Result};

use tracing::info;

/// The dashboard API server
pub struct Dashboard {
    server: server::HttpServer,
}

impl Dashboard {
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating dashboard instance");
        let server = server::HttpServer::new(&config).await?;
        Ok(Self { server })
    }

    pub async fn run(self) -> Result<()> {
        self.server.start().await
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "multicloud-dashboard");
        assert!(!DESCRIPTION.is_empty());
    }
}
