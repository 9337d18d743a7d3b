//! Bus Tracker HTTP Server Binary
//!
//! Main entry point for the bus tracking REST API. It builds the repository,
//! sets up the HTTP router, and serves requests until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin bus-tracker-server
//!
//! # Run against MongoDB
//! MONGODB_URI=mongodb://localhost:27017/bus_tracker \
//!   cargo run --bin bus-tracker-server --features mongo-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `REPOSITORY_CONFIG`: Path to a `repository.toml` (overrides the variables below)
//! - `REPOSITORY_TYPE`: `mongo` or `local`
//! - `MONGODB_URI` / `DATABASE_URL`: MongoDB connection string
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use bus_tracker::db::{ConnectionRepository, FullRepository, RepositoryConfig, RepositoryFactory};
use bus_tracker::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting bus tracker HTTP server");

    let repository = init_repository().await?;
    info!("Repository initialized successfully");

    let state = AppState::new(Arc::clone(&repository));
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on port {}", port);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing repository");
    if let Err(e) = repository.close().await {
        warn!(error = %e, "Failed to close repository cleanly");
    }

    Ok(())
}

/// `REPOSITORY_CONFIG` first, then a `repository.toml` in a standard
/// location, then plain environment variables.
async fn init_repository() -> anyhow::Result<Arc<dyn FullRepository>> {
    if let Ok(path) = env::var("REPOSITORY_CONFIG") {
        info!(%path, "Loading repository configuration");
        return Ok(RepositoryFactory::from_config_file(&path).await?);
    }

    match RepositoryConfig::from_default_location() {
        Ok(config) => {
            info!("Using repository.toml");
            Ok(RepositoryFactory::from_repository_config(&config).await?)
        }
        Err(e) => {
            debug!(reason = %e, "No usable repository.toml, reading environment");
            Ok(RepositoryFactory::from_env().await?)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
