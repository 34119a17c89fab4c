//! Process bootstrap shared by binaries: layered configuration, logging and
//! the database connection.

pub mod config;
pub mod db;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
