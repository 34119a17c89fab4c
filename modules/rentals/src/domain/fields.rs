//! Public field schemas of the two listings.

use listing_query::{FieldKind, FieldSchema, SortKey};
use once_cell::sync::Lazy;

pub mod flat {
    pub const TITLE: &str = "title";
    pub const CITY: &str = "city";
    pub const STREET_NAME: &str = "streetName";
    pub const STREET_NUMBER: &str = "streetNumber";
    pub const AREA_SIZE: &str = "areaSize";
    pub const HAS_AC: &str = "hasAc";
    pub const YEAR_BUILT: &str = "yearBuilt";
    pub const RENT_PRICE: &str = "rentPrice";
    pub const DATE_AVAILABLE: &str = "dateAvailable";
    pub const OWNER_ID: &str = "ownerId";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const ID: &str = "id";
}

pub mod user {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
    pub const AGE: &str = "age";
    pub const PUBLISHED_FLATS_COUNT: &str = "publishedFlatsCount";
    pub const FLATS_COUNT_ALIAS: &str = "flatsCount";
    pub const CREATED_AT: &str = "createdAt";
    pub const ID: &str = "id";
}

pub static FLAT_SCHEMA: Lazy<FieldSchema> = Lazy::new(|| {
    FieldSchema::new()
        .field(flat::TITLE, FieldKind::Text)
        .field(flat::CITY, FieldKind::Place)
        .field(flat::STREET_NAME, FieldKind::Text)
        .field(flat::STREET_NUMBER, FieldKind::Integer)
        .field(flat::AREA_SIZE, FieldKind::Number)
        .field(flat::HAS_AC, FieldKind::Bool)
        .field(flat::YEAR_BUILT, FieldKind::Integer)
        .field(flat::RENT_PRICE, FieldKind::Number)
        .field(flat::DATE_AVAILABLE, FieldKind::Date)
        .field(flat::OWNER_ID, FieldKind::Uuid)
        .sort_only(flat::CREATED_AT, FieldKind::DateTime)
        .sort_only(flat::UPDATED_AT, FieldKind::DateTime)
        .sort_only(flat::ID, FieldKind::Uuid)
});

pub static USER_SCHEMA: Lazy<FieldSchema> = Lazy::new(|| {
    FieldSchema::new()
        .field(user::FIRST_NAME, FieldKind::Text)
        .field(user::LAST_NAME, FieldKind::Text)
        .field(user::EMAIL, FieldKind::Text)
        .field(user::ROLE, FieldKind::Keyword)
        .field(user::AGE, FieldKind::Integer)
        .field(user::PUBLISHED_FLATS_COUNT, FieldKind::Integer)
        .alias(user::FLATS_COUNT_ALIAS, user::PUBLISHED_FLATS_COUNT)
        .sort_only(user::CREATED_AT, FieldKind::DateTime)
        .sort_only(user::ID, FieldKind::Uuid)
});

/// Ascending id is insertion order (UUID v7), so it settles every tie.
pub fn id_tiebreaker() -> SortKey {
    SortKey::asc(flat::ID, FieldKind::Uuid)
}
