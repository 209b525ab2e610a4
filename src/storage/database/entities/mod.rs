/// Password reset token entity module
pub mod password_reset_token;
/// User entity module
pub mod user;

pub use password_reset_token::Entity as PasswordResetToken;
pub use user::Entity as User;
