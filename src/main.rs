//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the database
//! - Starts the HTTP server with graceful shutdown support

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tglinks::config::Config;
use tglinks::database::{init_db, AppState};
use tglinks::route::create_app;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tglinks=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();
    if config.admin_token.is_none() {
        tracing::warn!("AUTHORIZATION is not set, the admin API is disabled");
    }

    let db = init_db(&config.database_url).expect("Failed to initialize database");
    tracing::info!("Using database: {}", config.database_url);

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(db, config);
    let app = create_app(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Server running at http://{}", addr);

    // The server keeps running until it receives SIGTERM or SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves on Ctrl+C, or SIGTERM on Unix, so in-flight requests and
/// database transactions finish before the process exits
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
