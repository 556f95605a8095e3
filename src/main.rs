//! Food Tracker
//!
//! HTTP server for logging meals and reading daily macro totals.

use food_tracker::build_info;
use food_tracker::config::ServerConfig;
use food_tracker::db::{migrations, Database};
use food_tracker::http::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Resolve once `signal` fires. If listening fails, never resolve.
async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("food_tracker=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = ServerConfig::from_env()?;
    info!(path = %config.database_path.display(), "Opening database");

    let database = Database::open(&config.database_path)?;
    let version = database.with_conn(migrations::get_schema_version)?;
    info!(version, "Database schema ready");

    let app = http::router(AppState::new(database, &config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_signal_triggers_shutdown() {
        let fired = async { Ok::<(), std::io::Error>(()) };
        let done = tokio::time::timeout(Duration::from_millis(200), wait_for_signal(fired)).await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn test_listener_failure_keeps_serving() {
        let failed = async { Err(std::io::Error::other("no signal handler")) };
        let done = tokio::time::timeout(Duration::from_millis(50), wait_for_signal(failed)).await;
        assert!(done.is_err());
    }
}
