//! Scanner Server
//!
//! Web front-end for a network scanner with PDF listing, download and
//! deletion, plus the static shell of the installable web app.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scanner_server::config::Config;
use scanner_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "scanner_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Scanner Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Scan script: {}", config.scanner.script.display());
    tracing::info!("Scans directory: {}", config.scanner.scans_dir.display());
    tracing::info!("Scan timeout: {}s", config.scanner.timeout_secs);

    if !config.scanner.script.is_file() {
        tracing::warn!(
            "Scan script {} not found, scans will fail until it is installed",
            config.scanner.script.display()
        );
    }
    if !config.scanner.scans_dir.is_dir() {
        tracing::warn!(
            "Scans directory {} does not exist yet",
            config.scanner.scans_dir.display()
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = scanner_server::app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Scanner Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
