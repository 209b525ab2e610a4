//! JWT token handling

mod handler;
pub mod types;
mod utils;

pub use types::{Claims, JwtHandler};
