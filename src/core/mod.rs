//! Core functionality for the dashboard
//!
//! Wire types, cloud provider adapters and the cross-provider aggregation layer.

pub mod aggregation;
pub mod providers;
pub mod types;
