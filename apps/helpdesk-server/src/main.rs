//! Helpdesk server entry point.
//!
//! Loads configuration, connects to the database and applies migrations, then
//! serves the helpdesk REST API with graceful shutdown. The notification
//! dispatcher runs alongside the server and is cancelled on shutdown.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use helpdesk_service::domain::TracingNotificationSink;
use helpdesk_service::HelpdeskServiceModule;

#[derive(Parser)]
#[command(name = "helpdesk-server", version, about = "Helpdesk ticketing server")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/helpdesk.yaml")]
    config: PathBuf,

    /// Apply migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    bind_addr: SocketAddr,

    #[serde(default = "default_database_url")]
    database_url: String,

    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    log_level: String,

    #[serde(default)]
    helpdesk: helpdesk_service::config::Config,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8087))
}

fn default_database_url() -> String {
    "sqlite://helpdesk.db?mode=rwc".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// YAML file first, then `HELPDESK__` environment variables
/// (`HELPDESK__HELPDESK__AUTO_CLOSE_DAYS=3` sets `helpdesk.auto_close_days`).
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("HELPDESK__").split("__"))
        .extract()
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(config = %cli.config.display(), "Helpdesk server starting");

    let db = sea_orm::Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let module = Arc::new(HelpdeskServiceModule::new(config.helpdesk));
    module.migrate(&db).await?;
    if cli.migrate_only {
        info!("migrations applied, exiting");
        return Ok(());
    }
    module.init(Arc::new(db))?;

    let api = module.register_rest(Router::new())?;
    let app = Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http());

    let cancel = CancellationToken::new();
    let dispatcher_handle = tokio::spawn(
        Arc::clone(&module).serve(cancel.clone(), Arc::new(TracingNotificationSink)),
    );

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Helpdesk server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .context("server error")?;

    // Server stopped on its own; make sure the dispatcher follows.
    cancel.cancel();
    info!("waiting for notification dispatcher to stop");
    match tokio::time::timeout(Duration::from_secs(10), dispatcher_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = %e, "notification dispatcher failed"),
        Ok(Err(e)) => warn!(error = %e, "notification dispatcher panicked"),
        Err(_) => warn!("notification dispatcher did not stop in time"),
    }

    info!("Helpdesk server stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    cancel.cancel();
}
