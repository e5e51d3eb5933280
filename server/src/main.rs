//! Plank Server - Main Entry Point
//!
//! Account deletion endpoint backend.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use plank_server::api::{self, AppState, AppStateConfig, CorsPolicy};
use plank_server::config;
use plank_server::upstream::{self, SupabaseIdentityClient, SupabaseStoreClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plank_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Plank Server"
    );

    if !config.has_store_credentials() {
        tracing::warn!(
            "SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY is empty. Deletion requests will fail."
        );
    }

    // Initialize upstream clients (one shared connection pool)
    let http = upstream::build_http_client(&config).context("Failed to build HTTP client")?;
    let store = SupabaseStoreClient::new(http.clone(), &config.store_url, &config.elevated_key);
    let identity = SupabaseIdentityClient::new(http, &config.store_url, &config.restricted_key);
    let cors = CorsPolicy::from_config(&config.cors).context("Invalid CORS header value")?;

    // Build application state
    let state = AppState::new(AppStateConfig {
        store: Arc::new(store),
        identity: Arc::new(identity),
        cors,
    });

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
