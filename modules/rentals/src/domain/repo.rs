//! Persistence ports. Object-safe and async via `async_trait`; the service
//! computes ids, timestamps and validation, repositories only persist.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use listing_query::{ListPage, ListQuery};
use uuid::Uuid;

use crate::contract::model::{Flat, FlatWithOwner, Message, MessageWithSender, User};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// `email` is already normalized (trimmed, lowercase).
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn password_hash(&self, id: Uuid) -> anyhow::Result<Option<String>>;
    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<()>;
    /// Profile fields only; the password columns are left alone.
    async fn update(&self, user: User) -> anyhow::Result<()>;
    /// Store a new hash, stamp `password_changed_at` and drop any reset token.
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        changed_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// `None` clears a pending reset.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(String, DateTime<Utc>)>,
    ) -> anyhow::Result<()>;
    /// User whose stored reset hash equals `token_hash` and has not expired at `now`.
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<User>>;
    async fn list_all(&self) -> anyhow::Result<Vec<User>>;
    /// Remove the user with their flats (and those flats' messages and
    /// favorites), the messages they sent and their favorites, in one
    /// transaction. Returns the image handles of the removed flats, or
    /// `None` when no such user exists.
    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<Vec<String>>>;
}

#[async_trait]
pub trait FlatsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Flat>>;
    async fn find_with_owner(&self, id: Uuid) -> anyhow::Result<Option<FlatWithOwner>>;
    /// Filtered, sorted page with the owner joined, plus the filtered total.
    async fn list_page(&self, query: &ListQuery) -> anyhow::Result<ListPage<FlatWithOwner>>;
    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Flat>>;
    /// Flats per owner, from one grouped query. Owners without flats are absent.
    async fn count_by_owner(&self) -> anyhow::Result<HashMap<Uuid, u64>>;
    async fn insert(&self, flat: Flat) -> anyhow::Result<()>;
    async fn update(&self, flat: Flat) -> anyhow::Result<()>;
    /// Remove the flat, its messages and every favorite pointing at it in one
    /// transaction. `None` when the flat does not exist, otherwise the
    /// released image handle (if any).
    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<Option<String>>>;
}

#[async_trait]
pub trait MessagesRepository: Send + Sync {
    async fn insert(&self, message: Message) -> anyhow::Result<()>;
    /// Oldest first. `sender` narrows to one sender's messages.
    async fn list_for_flat(
        &self,
        flat_id: Uuid,
        sender: Option<Uuid>,
    ) -> anyhow::Result<Vec<MessageWithSender>>;
}

#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// No-op when the pair already exists.
    async fn add(&self, user_id: Uuid, flat_id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()>;
    /// Returns whether a row was removed.
    async fn remove(&self, user_id: Uuid, flat_id: Uuid) -> anyhow::Result<bool>;
    /// Most recently added first.
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<FlatWithOwner>>;
}
