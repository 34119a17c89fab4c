use chrono::{DateTime, Utc};
use listing_query::{search_key, FieldKind};
use sea_orm::entity::prelude::*;

use crate::contract::model::Flat;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "flats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub city: String,
    pub street_name: String,
    /// Folded copies matched by the listing text filters.
    pub title_search: String,
    pub city_key: String,
    pub street_name_search: String,
    pub street_number: i32,
    #[sea_orm(column_type = "Double")]
    pub area_size: f64,
    pub has_ac: bool,
    pub year_built: i32,
    #[sea_orm(column_type = "Double")]
    pub rent_price: f64,
    pub date_available: DateTime<Utc>,
    pub image_url: String,
    pub image_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        super::favorite::Relation::Flat.def().rev()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Flat {
    fn from(m: Model) -> Self {
        Flat {
            id: m.id,
            owner_id: m.owner_id,
            title: m.title,
            city: m.city,
            street_name: m.street_name,
            street_number: m.street_number,
            area_size: m.area_size,
            has_ac: m.has_ac,
            year_built: m.year_built,
            rent_price: m.rent_price,
            date_available: m.date_available,
            image_url: m.image_url,
            image_handle: m.image_handle,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Flat> for ActiveModel {
    fn from(f: Flat) -> Self {
        use sea_orm::Set;
        ActiveModel {
            id: Set(f.id),
            owner_id: Set(f.owner_id),
            title_search: Set(search_key(FieldKind::Text, &f.title)),
            city_key: Set(search_key(FieldKind::Place, &f.city)),
            street_name_search: Set(search_key(FieldKind::Text, &f.street_name)),
            title: Set(f.title),
            city: Set(f.city),
            street_name: Set(f.street_name),
            street_number: Set(f.street_number),
            area_size: Set(f.area_size),
            has_ac: Set(f.has_ac),
            year_built: Set(f.year_built),
            rent_price: Set(f.rent_price),
            date_available: Set(f.date_available),
            image_url: Set(f.image_url),
            image_handle: Set(f.image_handle),
            created_at: Set(f.created_at),
            updated_at: Set(f.updated_at),
        }
    }
}
