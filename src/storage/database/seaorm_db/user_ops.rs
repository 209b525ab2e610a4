use crate::utils::error::{DashboardError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, user};
use super::types::SeaOrmDatabase;

/// Fields supplied when registering an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
}

impl SeaOrmDatabase {
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        debug!("Finding user by username: {}", username);

        entities::User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(DashboardError::Database)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        debug!("Finding user by email");

        entities::User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(DashboardError::Database)
    }

    /// Whether any account holds `role`
    pub async fn role_exists(&self, role: &str) -> Result<bool> {
        let count = entities::User::find()
            .filter(user::Column::Role.eq(role))
            .count(&self.db)
            .await
            .map_err(DashboardError::Database)?;
        Ok(count > 0)
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model> {
        debug!("Creating user: {}", new_user.username);

        let active_model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            created_at: Set(chrono::Utc::now().into()),
        };

        active_model
            .insert(&self.db)
            .await
            .map_err(DashboardError::Database)
    }

    pub async fn update_user_password(&self, username: &str, password_hash: &str) -> Result<()> {
        debug!("Updating password for user: {}", username);

        let mut user: user::ActiveModel = self
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| DashboardError::not_found("User not found."))?
            .into();

        user.password_hash = Set(password_hash.to_string());
        user.update(&self.db)
            .await
            .map_err(DashboardError::Database)?;

        Ok(())
    }
}
