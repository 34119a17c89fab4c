//! Database connection from [`DatabaseConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend};

use crate::config::{DatabaseConfig, MEMORY_DSN};

/// Rewrite a SQLite DSN so that a relative file path is rooted at `base_dir`.
/// `sqlite::memory:` and non-SQLite DSNs pass through unchanged.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let Some(rest) = dsn.strip_prefix("sqlite://") else {
        return Ok(dsn.to_string());
    };

    let (path_str, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(anyhow!("empty SQLite path in DSN"));
    }

    let mut path = PathBuf::from(path_str);
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if create_dirs {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
    }

    let mut out = format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Mask the password of a DSN before it is logged.
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_string();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}

/// Open the pool described by `cfg`. An in-memory SQLite database is pinned
/// to one connection so every query sees the same data.
pub async fn connect(cfg: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let url = cfg.url.trim();
    if url.is_empty() {
        return Err(anyhow!("database.url is not configured"));
    }
    let dsn = absolutize_sqlite_dsn(url, base_dir, true)?;
    let in_memory = dsn == MEMORY_DSN;

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if in_memory {
        opts.max_connections(1).min_connections(1);
    } else if let Some(max) = cfg.max_conns {
        opts.max_connections(max);
    }

    tracing::info!(dsn = %redact_credentials_in_dsn(&dsn), "connecting to database");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("cannot connect to {}", redact_credentials_in_dsn(&dsn)))?;

    if let (DbBackend::Sqlite, Some(ms)) = (db.get_database_backend(), cfg.busy_timeout_ms) {
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {ms}"))
            .await
            .context("PRAGMA busy_timeout failed")?;
    }

    tracing::info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}
