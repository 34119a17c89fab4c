//! Business rules for accounts, listings, messages and favorites.
//! Depends only on the ports in `domain::repo` and `domain::ports`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use listing_query::LimitCfg;
use tracing::{debug, warn};

use crate::config::RentalsConfig;
use crate::contract::model::{AuthSession, User};
use crate::domain::auth::TokenIssuer;
use crate::domain::error::DomainError;
use crate::domain::ports::{ImageStore, PasswordHasher, ResetNotifier};
use crate::domain::repo::{
    FavoritesRepository, FlatsRepository, MessagesRepository, UsersRepository,
};

mod favorites;
mod flats;
mod messages;
mod users;

pub use crate::domain::auth::Principal;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub limits: LimitCfg,
    pub min_password_len: usize,
    pub reset_token_ttl: Duration,
}

impl From<&RentalsConfig> for ServiceConfig {
    fn from(cfg: &RentalsConfig) -> Self {
        Self {
            limits: LimitCfg {
                default: cfg.default_page_size,
                max: cfg.max_page_size,
            },
            min_password_len: cfg.min_password_len,
            reset_token_ttl: Duration::minutes(cfg.reset_token_ttl_minutes),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&RentalsConfig::default())
    }
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub flats: Arc<dyn FlatsRepository>,
    pub messages: Arc<dyn MessagesRepository>,
    pub favorites: Arc<dyn FavoritesRepository>,
}

#[derive(Clone)]
pub struct Ports {
    pub images: Arc<dyn ImageStore>,
    pub notifier: Arc<dyn ResetNotifier>,
    pub hasher: Arc<dyn PasswordHasher>,
}

#[derive(Clone)]
pub struct Service {
    repos: Repositories,
    ports: Ports,
    tokens: TokenIssuer,
    config: ServiceConfig,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    pub fn new(repos: Repositories, ports: Ports, tokens: TokenIssuer, config: ServiceConfig) -> Self {
        Self {
            repos,
            ports,
            tokens,
            config,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn session(&self, user: User) -> Result<AuthSession, DomainError> {
        let token = self.tokens.issue(user.id, user.role, Self::now())?;
        Ok(AuthSession { token, user })
    }

    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let hasher = self.ports.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
            .map_err(|e| DomainError::internal(format!("{e:#}")))
    }

    async fn verify_password(&self, password: &str, hash: String) -> Result<bool, DomainError> {
        let hasher = self.ports.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("verify task failed: {e}")))
    }

    /// Released after the owning rows are gone; failures are only logged.
    async fn release_images(&self, handles: impl IntoIterator<Item = String>) {
        for handle in handles {
            match self.ports.images.release(&handle).await {
                Ok(()) => debug!(%handle, "image released"),
                Err(e) => warn!(%handle, error = %e, "image release failed"),
            }
        }
    }
}
