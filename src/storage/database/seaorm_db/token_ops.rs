use crate::utils::error::{DashboardError, Result};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, password_reset_token};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Store a reset token, replacing any earlier tokens for the same user
    pub async fn store_password_reset_token(
        &self,
        username: &str,
        token: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        debug!("Storing password reset token for user: {}", username);

        self.delete_password_reset_tokens_for(username).await?;

        let active_model = password_reset_token::ActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            token: Set(token.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            expires_at: Set(expires_at.into()),
        };

        entities::PasswordResetToken::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(DashboardError::Database)?;

        Ok(())
    }

    pub async fn find_password_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<password_reset_token::Model>> {
        entities::PasswordResetToken::find()
            .filter(password_reset_token::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(DashboardError::Database)
    }

    pub async fn delete_password_reset_token(&self, token: &str) -> Result<()> {
        entities::PasswordResetToken::delete_many()
            .filter(password_reset_token::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .map_err(DashboardError::Database)?;
        Ok(())
    }

    pub async fn delete_password_reset_tokens_for(&self, username: &str) -> Result<u64> {
        let result = entities::PasswordResetToken::delete_many()
            .filter(password_reset_token::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .map_err(DashboardError::Database)?;
        Ok(result.rows_affected)
    }
}
