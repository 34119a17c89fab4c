//! SeaORM-backed implementation of every repository port.
//!
//! Generic over the connection so it can run on a `DatabaseConnection` or
//! inside an outer transaction. Cascading deletes open their own
//! transaction (a savepoint when already inside one).

use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use listing_query::{ListPage, ListQuery};
use listing_query_db::{fetch_page, FieldMap};
use once_cell::sync::Lazy;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{Flat, FlatWithOwner, Message, MessageWithSender, User};
use crate::domain::fields;
use crate::domain::repo::{
    FavoritesRepository, FlatsRepository, MessagesRepository, UsersRepository,
};
use crate::infra::storage::entity::{favorite, flat, message, user};

static FLAT_COLUMNS: Lazy<FieldMap<flat::Entity>> = Lazy::new(|| {
    use fields::flat as f;
    FieldMap::new()
        .insert_searchable(f::TITLE, flat::Column::Title, flat::Column::TitleSearch)
        .insert_searchable(f::CITY, flat::Column::City, flat::Column::CityKey)
        .insert_searchable(
            f::STREET_NAME,
            flat::Column::StreetName,
            flat::Column::StreetNameSearch,
        )
        .insert(f::STREET_NUMBER, flat::Column::StreetNumber)
        .insert(f::AREA_SIZE, flat::Column::AreaSize)
        .insert(f::HAS_AC, flat::Column::HasAc)
        .insert(f::YEAR_BUILT, flat::Column::YearBuilt)
        .insert(f::RENT_PRICE, flat::Column::RentPrice)
        .insert(f::DATE_AVAILABLE, flat::Column::DateAvailable)
        .insert(f::OWNER_ID, flat::Column::OwnerId)
        .insert(f::CREATED_AT, flat::Column::CreatedAt)
        .insert(f::UPDATED_AT, flat::Column::UpdatedAt)
        .insert(f::ID, flat::Column::Id)
});

#[derive(Debug, FromQueryResult)]
struct OwnerFlatCount {
    owner_id: Uuid,
    flats: i64,
}

pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn with_owner((f, owner): (flat::Model, Option<user::Model>)) -> FlatWithOwner {
    FlatWithOwner {
        flat: f.into(),
        owner: owner.map(Into::into),
    }
}

/// Messages, favorites, then the flats themselves. Returns their image handles.
async fn delete_flats<C: ConnectionTrait>(conn: &C, flats: Vec<flat::Model>) -> Result<Vec<String>, DbErr> {
    if flats.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = flats.iter().map(|f| f.id).collect();
    message::Entity::delete_many()
        .filter(message::Column::FlatId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    favorite::Entity::delete_many()
        .filter(favorite::Column::FlatId.is_in(ids.clone()))
        .exec(conn)
        .await?;
    flat::Entity::delete_many()
        .filter(flat::Column::Id.is_in(ids))
        .exec(conn)
        .await?;
    Ok(flats.into_iter().filter_map(|f| f.image_handle).collect())
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find user by id failed")?;
        found.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find user by email failed")?;
        found.map(User::try_from).transpose()
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn password_hash(&self, id: Uuid) -> anyhow::Result<Option<String>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("password_hash failed")?;
        Ok(found.map(|m| m.password_hash))
    }

    async fn insert(&self, u: User, password_hash: String) -> anyhow::Result<()> {
        let m = user::ActiveModel {
            id: Set(u.id),
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            email: Set(u.email),
            birth_date: Set(u.birth_date),
            password_hash: Set(password_hash),
            role: Set(u.role.as_str().to_string()),
            password_changed_at: Set(u.password_changed_at),
            password_reset_hash: Set(None),
            password_reset_expires_at: Set(None),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        let _ = m.insert(&self.conn).await.context("insert user failed")?;
        Ok(())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        let m = user::ActiveModel {
            id: Set(u.id),
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            email: Set(u.email),
            birth_date: Set(u.birth_date),
            role: Set(u.role.as_str().to_string()),
            updated_at: Set(u.updated_at),
            ..Default::default()
        };
        let _ = m.update(&self.conn).await.context("update user failed")?;
        Ok(())
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
        changed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let m = user::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash),
            password_changed_at: Set(Some(changed_at)),
            password_reset_hash: Set(None),
            password_reset_expires_at: Set(None),
            updated_at: Set(changed_at),
            ..Default::default()
        };
        let _ = m.update(&self.conn).await.context("set_password failed")?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<(String, DateTime<Utc>)>,
    ) -> anyhow::Result<()> {
        let (hash, expires) = token.unzip();
        let m = user::ActiveModel {
            id: Set(id),
            password_reset_hash: Set(hash),
            password_reset_expires_at: Set(expires),
            ..Default::default()
        };
        let _ = m.update(&self.conn).await.context("set_reset_token failed")?;
        Ok(())
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find()
            .filter(user::Column::PasswordResetHash.eq(token_hash))
            .filter(user::Column::PasswordResetExpiresAt.gt(now))
            .one(&self.conn)
            .await
            .context("find_by_reset_token failed")?;
        found.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.conn)
            .await
            .context("list users failed")?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<Vec<String>>> {
        let txn = self.conn.begin().await.context("begin failed")?;

        if user::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("load user failed")?
            .is_none()
        {
            return Ok(None);
        }

        let owned = flat::Entity::find()
            .filter(flat::Column::OwnerId.eq(id))
            .all(&txn)
            .await
            .context("load owned flats failed")?;
        let images = delete_flats(&txn, owned)
            .await
            .context("delete owned flats failed")?;

        message::Entity::delete_many()
            .filter(message::Column::SenderId.eq(id))
            .exec(&txn)
            .await
            .context("delete sent messages failed")?;
        favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("delete favorites failed")?;
        user::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete user failed")?;

        txn.commit().await.context("commit failed")?;
        Ok(Some(images))
    }
}

#[async_trait::async_trait]
impl<C> FlatsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Flat>> {
        let found = flat::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find flat failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_with_owner(&self, id: Uuid) -> anyhow::Result<Option<FlatWithOwner>> {
        let found = flat::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.conn)
            .await
            .context("find flat with owner failed")?;
        Ok(found.map(with_owner))
    }

    async fn list_page(&self, query: &ListQuery) -> anyhow::Result<ListPage<FlatWithOwner>> {
        let select = flat::Entity::find().find_also_related(user::Entity);
        let page = fetch_page(select, &self.conn, query, &FLAT_COLUMNS)
            .await
            .context("list flats failed")?;
        Ok(page.map_items(with_owner))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Flat>> {
        let rows = flat::Entity::find()
            .filter(flat::Column::OwnerId.eq(owner_id))
            .order_by_desc(flat::Column::CreatedAt)
            .order_by_desc(flat::Column::Id)
            .all(&self.conn)
            .await
            .context("list flats by owner failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_owner(&self) -> anyhow::Result<HashMap<Uuid, u64>> {
        let rows = flat::Entity::find()
            .select_only()
            .column(flat::Column::OwnerId)
            .column_as(Expr::col(flat::Column::Id).count(), "flats")
            .group_by(flat::Column::OwnerId)
            .into_model::<OwnerFlatCount>()
            .all(&self.conn)
            .await
            .context("count flats by owner failed")?;
        Ok(rows
            .into_iter()
            .map(|r| (r.owner_id, u64::try_from(r.flats).unwrap_or(0)))
            .collect())
    }

    async fn insert(&self, f: Flat) -> anyhow::Result<()> {
        let m: flat::ActiveModel = f.into();
        let _ = m.insert(&self.conn).await.context("insert flat failed")?;
        Ok(())
    }

    async fn update(&self, f: Flat) -> anyhow::Result<()> {
        let mut m: flat::ActiveModel = f.into();
        // ownership and creation time never change
        m.owner_id = sea_orm::ActiveValue::NotSet;
        m.created_at = sea_orm::ActiveValue::NotSet;
        let _ = m.update(&self.conn).await.context("update flat failed")?;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<Option<String>>> {
        let txn = self.conn.begin().await.context("begin failed")?;
        let Some(found) = flat::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("load flat failed")?
        else {
            return Ok(None);
        };
        let mut images = delete_flats(&txn, vec![found])
            .await
            .context("delete flat failed")?;
        txn.commit().await.context("commit failed")?;
        Ok(Some(images.pop()))
    }
}

#[async_trait::async_trait]
impl<C> MessagesRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert(&self, msg: Message) -> anyhow::Result<()> {
        let m = message::ActiveModel {
            id: Set(msg.id),
            flat_id: Set(msg.flat_id),
            sender_id: Set(msg.sender_id),
            content: Set(msg.content),
            created_at: Set(msg.created_at),
        };
        let _ = m.insert(&self.conn).await.context("insert message failed")?;
        Ok(())
    }

    async fn list_for_flat(
        &self,
        flat_id: Uuid,
        sender: Option<Uuid>,
    ) -> anyhow::Result<Vec<MessageWithSender>> {
        let mut select = message::Entity::find().filter(message::Column::FlatId.eq(flat_id));
        if let Some(sender_id) = sender {
            select = select.filter(message::Column::SenderId.eq(sender_id));
        }
        let rows = select
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.conn)
            .await
            .context("list messages failed")?;
        Ok(rows
            .into_iter()
            .map(|(m, sender)| MessageWithSender {
                message: m.into(),
                sender: sender.map(Into::into),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<C> FavoritesRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn add(&self, user_id: Uuid, flat_id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        let m = favorite::ActiveModel {
            user_id: Set(user_id),
            flat_id: Set(flat_id),
            created_at: Set(at),
        };
        favorite::Entity::insert(m)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::FlatId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("add favorite failed")?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, flat_id: Uuid) -> anyhow::Result<bool> {
        let res = favorite::Entity::delete_by_id((user_id, flat_id))
            .exec(&self.conn)
            .await
            .context("remove favorite failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<FlatWithOwner>> {
        let rows = flat::Entity::find()
            .inner_join(favorite::Entity)
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_asc(flat::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.conn)
            .await
            .context("list favorites failed")?;
        Ok(rows.into_iter().map(with_owner).collect())
    }
}
