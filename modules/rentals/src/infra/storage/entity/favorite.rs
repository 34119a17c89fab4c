use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// `(user_id, flat_id)` marks a flat as a favorite of a user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub flat_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::flat::Entity",
        from = "Column::FlatId",
        to = "super::flat::Column::Id"
    )]
    Flat,
}

impl ActiveModelBehavior for ActiveModel {}
