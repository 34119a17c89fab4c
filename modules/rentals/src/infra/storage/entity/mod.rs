pub mod favorite;
pub mod flat;
pub mod message;
pub mod user;
