//! Services module
//!
//! Collaborators the core consumes but does not own.

pub mod accounts;

pub use accounts::CloudAccountManager;
