//! Utility modules for the dashboard
//!
//! - **error**: application error type and its HTTP mapping
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use logging::init_tracing;
