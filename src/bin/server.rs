//! Todo API Server
//!
//! Serves the todo resource API over HTTP.
//!
//! # Configuration
//!
//! Environment variables:
//! - `TODO_CONFIG`: Path to config file (default: ~/.config/todo-api/config.yaml)
//! - `TODO_STORE`: `sqlite` or `memory` (default: sqlite)
//! - `TODO_DATABASE_PATH`: SQLite database file (default: ~/.local/share/todo-api/todo.db)
//! - `TODO_COLLECTION`: Collection holding todo documents (default: Todo)
//! - `TODO_PORT`: Port to listen on (default: 8080)
//! - `TODO_REQUEST_TIMEOUT_SECS`: Per-request deadline (default: 30)
//!
//! # Config File Format
//!
//! ```yaml
//! store: sqlite
//! database_path: /var/lib/todo-api/todo.db
//! collection: Todo
//! port: 8080
//! request_timeout_secs: 30
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_api::config::{Config, CONFIG_ENV};
use todo_api::{open_store, server, TodoGateway};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_api=info,todo_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    match &config.config_file {
        Some(path) => tracing::info!("Config file: {}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }
    tracing::info!(
        "Store: {} (collection {})",
        config.store.value,
        config.collection.value
    );

    let store = open_store(&config).await?;
    let gateway = TodoGateway::new(store);

    let app = server::router(gateway, config.request_timeout());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
