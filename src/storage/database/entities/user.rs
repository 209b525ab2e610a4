use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dashboard account
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,

    /// Optional, used for password recovery
    #[sea_orm(unique)]
    pub email: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: String,

    /// `admin` or `viewer`
    pub role: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
