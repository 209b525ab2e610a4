//! Application state shared across HTTP handlers

use crate::auth::AuthSystem;
use crate::config::Config;
use crate::core::aggregation::Aggregator;
use crate::storage::StorageLayer;
use std::sync::Arc;

/// Shared resources handed to every handler through `web::Data`
#[derive(Clone, Debug)]
pub struct AppState {
    /// Dashboard configuration (shared read-only)
    pub config: Arc<Config>,
    pub auth: Arc<AuthSystem>,
    pub aggregator: Arc<Aggregator>,
    pub storage: Arc<StorageLayer>,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: AuthSystem,
        aggregator: Aggregator,
        storage: Arc<StorageLayer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            aggregator: Arc::new(aggregator),
            storage,
        }
    }

    /// Whether `forgot` responses may carry the reset token
    pub fn exposes_reset_token(&self) -> bool {
        self.config.auth().expose_reset_token || self.config.server().dev_mode
    }
}
