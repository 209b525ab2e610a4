mod connection;
mod token_ops;
mod types;
mod user_ops;

pub use types::{DatabaseBackendType, SeaOrmDatabase};
pub use user_ops::NewUser;
