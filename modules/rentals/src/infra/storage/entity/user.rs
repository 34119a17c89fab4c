use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::{Contact, User};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub birth_date: NaiveDate,
    pub password_hash: String,
    pub role: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub password_reset_hash: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let role = m
            .role
            .parse()
            .map_err(|e: String| anyhow::anyhow!("user {}: {e}", m.id))?;
        Ok(User {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            birth_date: m.birth_date,
            role,
            password_changed_at: m.password_changed_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<Model> for Contact {
    fn from(m: Model) -> Self {
        Contact {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
        }
    }
}
