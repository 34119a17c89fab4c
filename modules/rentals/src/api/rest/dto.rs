use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{
    Contact, Flat, FlatPatch, FlatWithOwner, MessageWithSender, NewFlat, NewUser, Role, User,
    UserPatch, UserSummary,
};

/* ---------- responses ---------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            birth_date: u.birth_date,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub age: u32,
    pub published_flats_count: u64,
}

impl From<UserSummary> for UserSummaryDto {
    fn from(s: UserSummary) -> Self {
        Self {
            user: s.user.into(),
            age: s.age,
            published_flats_count: s.published_flats_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<Contact> for ContactDto {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatDto {
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
    pub date_available: DateTime<Utc>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Flat> for FlatDto {
    fn from(f: Flat) -> Self {
        Self {
            id: f.id,
            owner_id: f.owner_id,
            title: f.title,
            city: f.city,
            street_name: f.street_name,
            street_number: f.street_number,
            area_size: f.area_size,
            has_ac: f.has_ac,
            year_built: f.year_built,
            rent_price: f.rent_price,
            date_available: f.date_available,
            image_url: f.image_url,
            image_handle: f.image_handle,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// A flat with its owner inlined under `owner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatWithOwnerDto {
    #[serde(flatten)]
    pub flat: FlatDto,
    pub owner: Option<ContactDto>,
}

impl From<FlatWithOwner> for FlatWithOwnerDto {
    fn from(f: FlatWithOwner) -> Self {
        Self {
            flat: f.flat.into(),
            owner: f.owner.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub flat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<ContactDto>,
}

impl From<MessageWithSender> for MessageDto {
    fn from(m: MessageWithSender) -> Self {
        let MessageWithSender { message, sender } = m;
        Self {
            id: message.id,
            flat_id: message.flat_id,
            sender_id: message.sender_id,
            content: message.content,
            created_at: message.created_at,
            sender: sender.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeDto {
    pub message: String,
}

/* ---------- requests ---------- */

/// Any `role` sent by the client is ignored; new accounts are plain users.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: NaiveDate,
}

impl From<RegisterReq> for NewUser {
    fn from(r: RegisterReq) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password: r.password,
            birth_date: r.birth_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Passwords are changed through their own endpoints, so unknown keys
/// (including `password`) are rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserReq {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<String>,
}

impl UpdateUserReq {
    pub fn into_patch(self) -> Result<UserPatch, String> {
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;
        Ok(UserPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            birth_date: self.birth_date,
            role,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordReq {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordReq {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordReq {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlatReq {
    pub title: String,
    pub city: String,
    pub street_name: String,
    pub street_number: i32,
    pub area_size: f64,
    #[serde(default)]
    pub has_ac: bool,
    pub year_built: i32,
    pub rent_price: f64,
    pub date_available: NaiveDate,
    pub image_url: String,
    #[serde(default)]
    pub image_handle: Option<String>,
}

impl From<CreateFlatReq> for NewFlat {
    fn from(r: CreateFlatReq) -> Self {
        Self {
            title: r.title,
            city: r.city,
            street_name: r.street_name,
            street_number: r.street_number,
            area_size: r.area_size,
            has_ac: r.has_ac,
            year_built: r.year_built,
            rent_price: r.rent_price,
            date_available: r.date_available,
            image_url: r.image_url,
            image_handle: r.image_handle,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateFlatReq {
    pub title: Option<String>,
    pub city: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<i32>,
    pub area_size: Option<f64>,
    pub has_ac: Option<bool>,
    pub year_built: Option<i32>,
    pub rent_price: Option<f64>,
    pub date_available: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub image_handle: Option<String>,
}

impl From<UpdateFlatReq> for FlatPatch {
    fn from(r: UpdateFlatReq) -> Self {
        Self {
            title: r.title,
            city: r.city,
            street_name: r.street_name,
            street_number: r.street_number,
            area_size: r.area_size,
            has_ac: r.has_ac,
            year_built: r.year_built,
            rent_price: r.rent_price,
            date_available: r.date_available,
            image_url: r.image_url,
            image_handle: r.image_handle,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageReq {
    pub content: String,
}
