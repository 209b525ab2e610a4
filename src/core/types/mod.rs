//! Core type definition module
//!
//! Wire-level value objects produced by cloud adapters and merged by the aggregation layer.
//! Everything here is transient: built per request and discarded after serialization.

pub mod aggregate;
pub mod costs;
pub mod insights;
pub mod metrics;

pub use aggregate::*;
pub use costs::*;
pub use insights::*;
pub use metrics::*;

/// Round a value to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
