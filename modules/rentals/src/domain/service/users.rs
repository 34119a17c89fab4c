use listing_query::{memory, ListPage, ListQuery};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{db_err, Principal, Service};
use crate::contract::model::{AuthSession, NewUser, Role, User, UserPatch, UserSummary};
use crate::domain::auth::{hash_reset_token, issued_before_password_change, new_reset_token};
use crate::domain::derived::age_on;
use crate::domain::error::DomainError;
use crate::domain::fields::{id_tiebreaker, USER_SCHEMA};
use crate::domain::validation;

impl Service {
    #[instrument(name = "rentals.service.register", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<AuthSession, DomainError> {
        info!("Registering user");
        let now = Self::now();
        let email = validation::normalize_email(&new_user.email);

        validation::required("firstName", &new_user.first_name)?;
        validation::required("lastName", &new_user.last_name)?;
        validation::email(&email)?;
        validation::password(&new_user.password, self.config.min_password_len)?;
        validation::birth_date(new_user.birth_date, now.date_naive())?;

        if self.repos.users.email_exists(&email).await.map_err(db_err)? {
            return Err(DomainError::email_already_exists(email));
        }

        let password_hash = self.hash_password(&new_user.password).await?;
        let user = User {
            id: Uuid::now_v7(),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            email,
            birth_date: new_user.birth_date,
            role: Role::User,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .users
            .insert(user.clone(), password_hash)
            .await
            .map_err(db_err)?;

        info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(name = "rentals.service.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = validation::normalize_email(email);
        let Some(user) = self.repos.users.find_by_email(&email).await.map_err(db_err)? else {
            debug!("Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };
        let hash = self
            .repos
            .users
            .password_hash(user.id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::InvalidCredentials)?;
        if !self.verify_password(password, hash).await? {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    /// Resolve a bearer token to the current caller.
    #[instrument(name = "rentals.service.authenticate", skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .repos
            .users
            .find_by_id(claims.sub)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::unauthenticated("the user of this token no longer exists"))?;
        if issued_before_password_change(&claims, user.password_changed_at) {
            return Err(DomainError::unauthenticated(
                "password was changed recently, please log in again",
            ));
        }
        Ok(Principal {
            id: user.id,
            role: user.role,
        })
    }

    #[instrument(name = "rentals.service.get_user", skip(self, caller), fields(user_id = %id))]
    pub async fn get_user(&self, caller: &Principal, id: Uuid) -> Result<User, DomainError> {
        if !caller.can_manage(id) {
            return Err(DomainError::forbidden("you can only view your own account"));
        }
        self.repos
            .users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// Admin listing. Age and published-flats count are derived per request,
    /// so filtering and sorting run in memory over every account.
    #[instrument(name = "rentals.service.list_users", skip(self, caller, params))]
    pub async fn list_users<'a, I>(
        &self,
        caller: &Principal,
        params: I,
    ) -> Result<ListPage<UserSummary>, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if !caller.is_admin() {
            return Err(DomainError::forbidden("only administrators can list users"));
        }
        let query = ListQuery::from_pairs(params, &USER_SCHEMA, self.config.limits)?
            .with_tiebreaker(id_tiebreaker());

        let (users, counts) = tokio::try_join!(
            self.repos.users.list_all(),
            self.repos.flats.count_by_owner()
        )
        .map_err(db_err)?;

        let today = Self::now().date_naive();
        let rows: Vec<UserSummary> = users
            .into_iter()
            .map(|user| UserSummary {
                age: age_on(user.birth_date, today),
                published_flats_count: counts.get(&user.id).copied().unwrap_or(0),
                user,
            })
            .collect();

        let page = memory::execute(rows, &query);
        debug!(total = page.total_count, returned = page.count(), "Listed users");
        Ok(page)
    }

    #[instrument(name = "rentals.service.update_user", skip(self, caller, patch), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        caller: &Principal,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        info!("Updating user");
        if !caller.can_manage(id) {
            return Err(DomainError::forbidden("you can only update your own account"));
        }
        if patch.role.is_some() && !caller.is_admin() {
            return Err(DomainError::forbidden("only administrators can change roles"));
        }

        let mut current = self
            .repos
            .users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        let now = Self::now();

        if let Some(first) = patch.first_name {
            validation::required("firstName", &first)?;
            current.first_name = first.trim().to_string();
        }
        if let Some(last) = patch.last_name {
            validation::required("lastName", &last)?;
            current.last_name = last.trim().to_string();
        }
        if let Some(birth) = patch.birth_date {
            validation::birth_date(birth, now.date_naive())?;
            current.birth_date = birth;
        }
        if let Some(email) = patch.email {
            let email = validation::normalize_email(&email);
            validation::email(&email)?;
            if email != current.email
                && self.repos.users.email_exists(&email).await.map_err(db_err)?
            {
                return Err(DomainError::email_already_exists(email));
            }
            current.email = email;
        }
        if let Some(role) = patch.role {
            current.role = role;
        }
        current.updated_at = now;

        self.repos
            .users
            .update(current.clone())
            .await
            .map_err(db_err)?;
        info!("User updated");
        Ok(current)
    }

    #[instrument(name = "rentals.service.update_password", skip_all, fields(user_id = %caller.id))]
    pub async fn update_password(
        &self,
        caller: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> Result<AuthSession, DomainError> {
        let hash = self
            .repos
            .users
            .password_hash(caller.id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(caller.id))?;
        if !self.verify_password(current_password, hash).await? {
            return Err(DomainError::unauthenticated("your current password is wrong"));
        }
        self.change_password(caller.id, new_password).await
    }

    /// Always succeeds for well-formed input so callers cannot probe for
    /// registered emails.
    #[instrument(name = "rentals.service.forgot_password", skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let email = validation::normalize_email(email);
        let Some(user) = self.repos.users.find_by_email(&email).await.map_err(db_err)? else {
            debug!("Reset requested for unknown email");
            return Ok(());
        };

        let token = new_reset_token();
        let expires = Self::now() + self.config.reset_token_ttl;
        self.repos
            .users
            .set_reset_token(user.id, Some((hash_reset_token(&token), expires)))
            .await
            .map_err(db_err)?;

        if let Err(e) = self.ports.notifier.send_reset(&user.email, &token).await {
            warn!(user_id = %user.id, error = %e, "Reset notification failed, token discarded");
            self.repos
                .users
                .set_reset_token(user.id, None)
                .await
                .map_err(db_err)?;
            return Ok(());
        }
        info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    #[instrument(name = "rentals.service.reset_password", skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<AuthSession, DomainError> {
        let user = self
            .repos
            .users
            .find_by_reset_token(&hash_reset_token(token.trim()), Self::now())
            .await
            .map_err(db_err)?
            .ok_or(DomainError::InvalidResetToken)?;
        self.change_password(user.id, new_password).await
    }

    async fn change_password(&self, id: Uuid, new_password: &str) -> Result<AuthSession, DomainError> {
        validation::password(new_password, self.config.min_password_len)?;
        let hash = self.hash_password(new_password).await?;
        let now = Self::now();
        self.repos
            .users
            .set_password(id, hash, now)
            .await
            .map_err(db_err)?;

        let user = self
            .repos
            .users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        info!(user_id = %id, "Password changed");
        self.session(user)
    }

    #[instrument(name = "rentals.service.delete_user", skip(self, caller), fields(user_id = %id))]
    pub async fn delete_user(&self, caller: &Principal, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");
        if !caller.can_manage(id) {
            return Err(DomainError::forbidden("you can only delete your own account"));
        }
        let images = self
            .repos
            .users
            .delete_cascade(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        self.release_images(images).await;
        info!("User deleted");
        Ok(())
    }

    /// Operator action from the command line; no caller check.
    #[instrument(name = "rentals.service.promote_to_admin", skip(self))]
    pub async fn promote_to_admin(&self, email: &str) -> Result<User, DomainError> {
        let email = validation::normalize_email(email);
        let mut user = self
            .repos
            .users
            .find_by_email(&email)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::validation("email", format!("no account for '{email}'")))?;
        if user.role.is_admin() {
            return Ok(user);
        }
        user.role = Role::Admin;
        user.updated_at = Self::now();
        self.repos
            .users
            .update(user.clone())
            .await
            .map_err(db_err)?;
        info!(user_id = %user.id, "User promoted to admin");
        Ok(user)
    }
}
