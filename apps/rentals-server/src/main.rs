use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use api_ingress::{shutdown::cancel_on_signal, ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use rentals::{config::RentalsConfig, Rentals};
use runtime::{AppConfig, CliArgs};
use tokio_util::sync::CancellationToken;

/// Rentals Server - flat rental marketplace API
#[derive(Parser)]
#[command(name = "rentals-server")]
#[command(about = "Rentals Server - flat rental marketplace API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Grant the admin role to an existing account
    Promote {
        /// Email the account was registered with
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Rentals Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Promote { email } => promote(config, &email).await,
    }
}

/// Connect, migrate and wire the rentals module.
async fn init_rentals(config: &AppConfig) -> Result<Rentals> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("database section is required"))?;
    let db = runtime::db::connect(db_config, &config.home_dir()).await?;

    let rentals_config: RentalsConfig = config.module_config("rentals")?;
    let rentals = Rentals::init(db, &rentals_config);
    rentals.migrate().await?;
    Ok(rentals)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let rentals = init_rentals(&config).await?;

    let ingress_config: ApiIngressConfig = config.module_config("api_ingress")?;
    let ingress = ApiIngress::new(ingress_config)
        .with_timeout(Duration::from_secs(config.server.timeout_sec));
    let router = ingress.build_router(rentals.register_rest(Router::new())?);

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let addr = ingress
        .config()
        .bind_addr_or(&config.server.host, config.server.port);
    ingress.serve(&addr, router, cancel).await?;
    tracing::info!("Rentals Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.module_config::<RentalsConfig>("rentals")?;
    config.module_config::<ApiIngressConfig>("api_ingress")?;
    if config.database.is_none() {
        tracing::warn!("no database section; `run` will fail");
    }

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn promote(config: AppConfig, email: &str) -> Result<()> {
    let rentals = init_rentals(&config).await?;
    let user = rentals
        .service()
        .promote_to_admin(email)
        .await
        .map_err(|e| anyhow!("cannot promote '{email}': {e}"))?;
    tracing::info!(user_id = %user.id, "account promoted to admin");
    println!("{} is now an admin", user.email);
    Ok(())
}
