//! stead server binary — entry point for the property-management backend.
//!
//! `stead-server [command] [config-path]` where command is one of:
//!
//! - `serve` (default): start the HTTP server with graceful shutdown.
//! - `init-db`: destructively reset the database schema.
//! - `seed-db`: insert sample users and properties (no-op when non-empty).

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use stead_server::{app, config, seed, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    InitDb,
    SeedDb,
}

/// Splits argv into the command and an optional config path.
fn parse_args() -> (Command, Option<String>) {
    let mut args = std::env::args().skip(1);
    let first = args.next();
    match first.as_deref() {
        Some("init-db") => (Command::InitDb, args.next()),
        Some("seed-db") => (Command::SeedDb, args.next()),
        Some("serve") => (Command::Serve, args.next()),
        // A bare argument is a config path.
        Some(_) => (Command::Serve, first),
        None => (Command::Serve, None),
    }
}

fn resolve_config_path(cli_path: Option<String>) -> (Option<String>, &'static str) {
    if let Some(path) = cli_path.filter(|value| !value.trim().is_empty()) {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("STEAD_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (command, cli_config_path) = parse_args();
    let (resolved_config_path, config_source) = resolve_config_path(cli_config_path);
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize database
    let db_path = config
        .database_path()
        .expect("database path is not configured — set STEAD_DB_PATH or database.path");
    let pool = stead_db::create_pool(
        db_path,
        stead_db::DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to create database pool — check database.path in config");

    match command {
        Command::InitDb => {
            let conn = pool.get().expect("failed to get database connection");
            stead_db::reset_schema(&conn).expect("failed to reset database schema");
            tracing::info!("initialized the database");
            return;
        }
        Command::SeedDb => {
            let conn = pool.get().expect("failed to get database connection");
            let inserted = seed::seed_sample_data(&conn)
                .expect("failed to seed the database — run init-db first?");
            if inserted {
                tracing::info!("populated the database with sample data");
            } else {
                tracing::info!("database already has users, nothing to seed");
            }
            return;
        }
        Command::Serve => {}
    }

    // Build application
    let app = app(AppState { pool });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting stead server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("stead server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
