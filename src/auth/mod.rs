//! Authentication and authorization
//!
//! Bearer JWTs for API access, argon2 password hashes, and single-use reset tokens.

pub mod jwt;
pub mod password;
pub mod system;
pub mod types;

pub use jwt::{Claims, JwtHandler};
pub use system::AuthSystem;
pub use types::{
    ClientZone, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    Role, UserInfo,
};
