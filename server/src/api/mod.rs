//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod cors;

use std::any::Any;
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    account::{self, AccountError},
    upstream::{PrivilegedStoreClient, UserScopedIdentityClient},
};

pub use cors::CorsPolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Service-role access to the data store and auth admin API
    pub store: Arc<dyn PrivilegedStoreClient>,
    /// Anon-key token verification
    pub identity: Arc<dyn UserScopedIdentityClient>,
    /// CORS headers merged into every response
    pub cors: CorsPolicy,
}

/// Configuration for creating [`AppState`].
pub struct AppStateConfig {
    pub store: Arc<dyn PrivilegedStoreClient>,
    pub identity: Arc<dyn UserScopedIdentityClient>,
    pub cors: CorsPolicy,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(cfg: AppStateConfig) -> Self {
        Self {
            store: cfg.store,
            identity: cfg.identity,
            cors: cfg.cors,
        }
    }
}

/// Create the main application router.
///
/// The deletion handler is mounted both at the bare path and under the
/// edge-function prefix existing clients call.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account deletion (any method, OPTIONS is the preflight)
        .route("/delete-user", any(account::delete_user))
        .route("/functions/v1/delete-user", any(account::delete_user))
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), cors::apply_cors_headers))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Render a handler panic as the generic internal error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AccountError::Internal(format!("handler panicked: {detail}")).into_response()
}
