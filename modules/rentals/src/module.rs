use std::sync::Arc;

use axum::Router;
use chrono::Duration;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::RentalsConfig;
use crate::domain::auth::TokenIssuer;
use crate::domain::service::{Ports, Repositories, Service, ServiceConfig};
use crate::infra::adapters::{LogResetNotifier, LoggingImageStore};
use crate::infra::security::Argon2Hasher;
use crate::infra::storage::{migrations::Migrator, SeaOrmRepository};

/// The rentals module: owns the domain service and its storage.
#[derive(Clone)]
pub struct Rentals {
    db: DatabaseConnection,
    service: Arc<Service>,
}

impl Rentals {
    /// Wire the module with the built-in collaborators (logging image store
    /// and reset notifier, Argon2id hasher).
    pub fn init(db: DatabaseConnection, cfg: &RentalsConfig) -> Self {
        let ports = Ports {
            images: Arc::new(LoggingImageStore),
            notifier: Arc::new(LogResetNotifier),
            hasher: Arc::new(Argon2Hasher::default()),
        };
        Self::with_ports(db, cfg, ports)
    }

    pub fn with_ports(db: DatabaseConnection, cfg: &RentalsConfig, ports: Ports) -> Self {
        info!("Initializing rentals module");
        debug!(
            "Loaded rentals config: default_page_size={}, max_page_size={}, token_ttl_hours={}",
            cfg.default_page_size, cfg.max_page_size, cfg.token_ttl_hours
        );
        if cfg.jwt_secret == RentalsConfig::default().jwt_secret {
            warn!("modules.rentals.jwt_secret is the built-in default; set a real secret");
        }

        let repo = Arc::new(SeaOrmRepository::new(db.clone()));
        let repos = Repositories {
            users: repo.clone(),
            flats: repo.clone(),
            messages: repo.clone(),
            favorites: repo,
        };
        let tokens = TokenIssuer::new(&cfg.jwt_secret, Duration::hours(cfg.token_ttl_hours));
        let service = Service::new(repos, ports, tokens, ServiceConfig::from(cfg));

        Self {
            db,
            service: Arc::new(service),
        }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running rentals database migrations");
        Migrator::up(&self.db, None).await?;
        info!("Rentals database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        info!("Registering rentals REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Rentals REST routes registered successfully");
        Ok(router)
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}
