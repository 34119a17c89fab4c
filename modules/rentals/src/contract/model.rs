//! Transport-agnostic domain models. No serde here; the REST layer owns
//! the wire shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: NaiveDate,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<Role>,
}

/// Row of the admin user listing, with the derived fields filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub user: User,
    pub age: u32,
    pub published_flats_count: u64,
}

/// Public identity of an owner or message sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for Contact {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flat {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub city: String,
    pub street_name: String,
    pub street_number: i32,
    pub area_size: f64,
    pub has_ac: bool,
    pub year_built: i32,
    pub rent_price: f64,
    /// Midnight UTC of the first available day.
    pub date_available: DateTime<Utc>,
    pub image_url: String,
    /// Opaque reference handed back to the image store on removal.
    pub image_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFlat {
    pub title: String,
    pub city: String,
    pub street_name: String,
    pub street_number: i32,
    pub area_size: f64,
    pub has_ac: bool,
    pub year_built: i32,
    pub rent_price: f64,
    pub date_available: NaiveDate,
    pub image_url: String,
    pub image_handle: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FlatPatch {
    pub title: Option<String>,
    pub city: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<i32>,
    pub area_size: Option<f64>,
    pub has_ac: Option<bool>,
    pub year_built: Option<i32>,
    pub rent_price: Option<f64>,
    pub date_available: Option<NaiveDate>,
    /// Replacing the image releases the previous handle.
    pub image_url: Option<String>,
    pub image_handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatWithOwner {
    pub flat: Flat,
    pub owner: Option<Contact>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub flat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageWithSender {
    pub message: Message,
    pub sender: Option<Contact>,
}

/// A signed bearer token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" user ".parse::<Role>().unwrap(), Role::User);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
