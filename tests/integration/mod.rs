//! Integration tests
//!
//! These tests drive the public API across module boundaries: factory and
//! accounts feeding the aggregator, auth against a migrated database, and the
//! full HTTP surface in mock mode.

pub mod accounts_tests;
pub mod aggregation_tests;
pub mod auth_tests;
pub mod factory_tests;
pub mod routes_tests;
