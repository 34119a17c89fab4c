use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Message;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub flat_id: Uuid,
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flat::Entity",
        from = "Column::FlatId",
        to = "super::flat::Column::Id"
    )]
    Flat,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id"
    )]
    Sender,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Message {
    fn from(m: Model) -> Self {
        Message {
            id: m.id,
            flat_id: m.flat_id,
            sender_id: m.sender_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}
