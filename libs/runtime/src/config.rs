use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::paths::home_dir::resolve_home_dir;

/// Subdirectory of the platform home used when `server.home_dir` is empty.
pub const DEFAULT_HOME_SUBDIR: &str = ".rentals";

/// DSN used by `--mock`.
pub const MEMORY_DSN: &str = "sqlite::memory:";

/// Strongly typed global sections plus a per-module bag
/// (`modules.<name>` → arbitrary YAML, decoded by the owning module).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    /// Uses [`default_logging_config`] when absent.
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Normalized to an absolute path on load.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Per-request timeout; 0 disables it.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_timeout_sec() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite://path/to/file.db?mode=rwc`, `sqlite::memory:` or `postgres://...`.
    /// Relative SQLite paths are resolved against `server.home_dir`.
    pub url: String,
    pub max_conns: Option<u32>,
    /// SQLite only.
    pub busy_timeout_ms: Option<u32>,
}

/// Logging sections keyed by target prefix (`rentals`, `api_ingress`, ...).
/// `default` covers every target no other section claims.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// `trace` | `debug` | `info` | `warn` | `error` | `off`
    pub console_level: String,
    /// Empty disables the file sink. Relative to `server.home_dir`.
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_sec: default_timeout_sec(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database/rentals.db?mode=rwc".to_string(),
            max_conns: Some(10),
            busy_timeout_ms: Some(5000),
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/rentals.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig::default()),
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// defaults → YAML file → `APP__` environment (`APP__SERVER__PORT=9000`).
    /// Optional sections stay `None` unless the file or environment sets them.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        if !config_path.as_ref().is_file() {
            bail!("config file not found: {}", config_path.as_ref().display());
        }

        let base = AppConfig {
            server: ServerConfig::default(),
            database: None,
            logging: None,
            modules: HashMap::new(),
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .with_context(|| {
                format!(
                    "invalid configuration in {}",
                    config_path.as_ref().display()
                )
            })?;

        normalize_home_dir_inplace(&mut config.server)
            .context("failed to resolve server.home_dir")?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(&self.server.home_dir)
    }

    /// Typed view of `modules.<name>`; `T::default()` when the section is absent.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid config for module '{name}'")),
            None => Ok(T::default()),
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.mock {
            let db = self.database.get_or_insert_with(DatabaseConfig::default);
            db.url = MEMORY_DSN.to_string();
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

/// Empty `home_dir` means the platform default.
fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let configured = Some(server.home_dir.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let resolved = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)?;
    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
