//! Common test utilities
//!
//! ```rust
//! use crate::common::{database, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = database::TestDatabase::new().await;
//!     let config = fixtures::mock_config();
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::{env_from, mock_config};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
