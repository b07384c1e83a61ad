//! walletdb - Wallet Ledger Service
//!
//! ```text
//! walletdb [--env ENV] [--port PORT] [serve | migrate | seed [PATH]]
//! ```
//!
//! - `serve` (default): run the HTTP gateway until Ctrl-C
//! - `migrate`: apply pending schema migrations
//! - `seed`: run a SQL script, `scripts/seed.sql` unless PATH is given

use std::sync::Arc;

use anyhow::{Context, Result};

use walletdb::config::AppConfig;
use walletdb::db::Database;
use walletdb::gateway::{self, AppState};
use walletdb::service::WalletService;

const DEFAULT_SEED_PATH: &str = "scripts/seed.sql";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve,
    Migrate,
    Seed(String),
}

fn get_env(args: &[String]) -> String {
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override(args: &[String]) -> Option<u16> {
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

/// First positional argument picks the command; flag values are skipped.
fn get_command(args: &[String]) -> Result<Command> {
    let mut positional = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--env" | "-e" | "--port" => i += 2,
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }

    match positional.as_slice() {
        [] | ["serve"] => Ok(Command::Serve),
        ["migrate"] => Ok(Command::Migrate),
        ["seed"] => Ok(Command::Seed(DEFAULT_SEED_PATH.to_string())),
        ["seed", path] => Ok(Command::Seed(path.to_string())),
        other => anyhow::bail!("Unknown command: {}", other.join(" ")),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = get_command(&args)?;

    let env = get_env(&args);
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("loading config for env {:?}", env))?;
    if let Some(port) = get_port_override(&args) {
        app_config.gateway.port = port;
    }
    let _log_guard = walletdb::logging::init_logging(&app_config);

    tracing::info!(env = %env, command = ?command, "Starting walletdb");

    let database_url = app_config.database_url()?;
    let db = Database::connect(database_url, app_config.postgres_max_connections)
        .await
        .context("connecting to PostgreSQL")?;

    match command {
        Command::Migrate => {
            db.migrate().await.context("applying migrations")?;
        }
        Command::Seed(path) => {
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("reading seed script {}", path))?;
            db.seed(&sql)
                .await
                .with_context(|| format!("running seed script {}", path))?;
        }
        Command::Serve => {
            let service = WalletService::new(db.pool().clone(), app_config.fee_rate);
            let state = Arc::new(AppState::new(db.clone(), service));
            gateway::run_server(&app_config.gateway, state, shutdown_signal())
                .await
                .context("gateway server")?;
        }
    }

    Ok(())
}
