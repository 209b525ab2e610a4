//! Test suite for multicloud-dashboard
//!
//! ## Test Categories
//!
//! ### 1. Common Utilities (`common/`)
//! Shared test infrastructure:
//! - In-memory SQLite database helpers
//! - Configuration and account fixtures
//!
//! ### 2. Integration Tests (`integration/`)
//! Tests that verify component interactions:
//! - Provider factory and accounts
//! - Cross-provider aggregation
//! - Authentication flows against a real database
//! - HTTP routes through `actix_web::test`
//!
//! ## Running Tests
//!
//! ```bash
//! # Everything
//! cargo test
//!
//! # Integration tests only
//! cargo test --test lib
//! ```

pub mod common;
pub mod integration;
