//! Request guards

pub mod auth;

pub use auth::{AuthenticatedUser, require_role};
