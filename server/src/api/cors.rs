//! CORS Headers
//!
//! The deletion endpoint is called straight from browser and mobile web
//! clients, so every response (errors and panics included) carries the same
//! static CORS header set. Preflight requests are answered by the handler.

use axum::extract::{Request, State};
use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use super::AppState;
use crate::config::CorsConfig;

/// Pre-parsed CORS header values.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_headers: HeaderValue,
    allow_methods: HeaderValue,
}

impl CorsPolicy {
    /// Parse the configured values once at startup.
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
        })
    }

    /// Overwrite the CORS headers in `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_headers: HeaderValue::from_static(crate::config::DEFAULT_CORS_ALLOW_HEADERS),
            allow_methods: HeaderValue::from_static("POST, OPTIONS"),
        }
    }
}

/// Middleware merging the CORS header set into every response.
pub async fn apply_cors_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    state.cors.apply(response.headers_mut());
    response
}
