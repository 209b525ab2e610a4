//! HTTP server for the dashboard API
//!
//! Wires configuration, storage, authentication and provider aggregation into actix-web.

pub mod builder;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use builder::run_server;
pub use server::HttpServer;
pub use state::AppState;
