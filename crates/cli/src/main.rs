//! `carzone` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the HTTP server.
//! - `schema`: create the `engine` / `car` tables if missing.
//! - `validate-car`: validate a car request JSON file offline.
//! - `validate-engine`: validate an engine request JSON file offline.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{AppState, AuthConfig};
use db::{Database, PgCarStore, PgEngineStore};
use domain::{validate_car_request, validate_engine_request, CarRequest, EngineRequest, ValidationError};
use service::{CarService, EngineService, ServiceConfig};

use config::Config;

/// How long the pool gets to close after the server has drained.
const POOL_CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "carzone", about = "Car and engine records service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        /// Listen address; defaults to 0.0.0.0:$PORT.
        #[arg(long, env = "BIND_ADDR")]
        bind: Option<String>,
    },
    /// Create the database tables if they do not exist.
    Schema,
    /// Validate a car request JSON file.
    ValidateCar {
        /// Path to the car JSON file.
        path: PathBuf,
    },
    /// Validate an engine request JSON file.
    ValidateEngine {
        /// Path to the engine JSON file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => serve(bind).await,
        Command::Schema => {
            let db = Database::connect(&config::db_config_from_env()?).await?;
            db.apply_schema().await?;
            info!("Schema applied successfully");
            db.close(POOL_CLOSE_GRACE).await;
            Ok(())
        }
        Command::ValidateCar { path } => {
            let req: CarRequest = read_json(&path)?;
            report(validate_car_request(&req));
            Ok(())
        }
        Command::ValidateEngine { path } => {
            let req: EngineRequest = read_json(&path)?;
            report(validate_engine_request(&req));
            Ok(())
        }
    }
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    let bind = bind.unwrap_or_else(|| format!("0.0.0.0:{}", config.port));

    let db = Database::connect(&config.db).await?;

    let service_config = ServiceConfig {
        operation_timeout: config.operation_timeout,
    };
    let state = AppState::new(
        CarService::new(Arc::new(PgCarStore::new(&db)), service_config.clone()),
        EngineService::new(Arc::new(PgEngineStore::new(&db)), service_config),
        AuthConfig::new(
            &config.jwt_secret,
            config.token_ttl,
            config.admin_user,
            config.admin_password,
        ),
    );

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    api::serve(listener, state, shutdown_signal()).await?;

    db.close(POOL_CLOSE_GRACE).await;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).context("invalid JSON")
}

fn report(result: Result<(), ValidationError>) {
    match result {
        Ok(()) => println!("✅ Request is valid."),
        Err(e) => {
            eprintln!("❌ Validation failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown"),
        _ = terminate => info!("Received SIGTERM, starting shutdown"),
    }
}
