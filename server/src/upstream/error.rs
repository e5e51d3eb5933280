//! Upstream Error Types

use thiserror::Error;

/// Errors from the data store (PostgREST).
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The configured store URL cannot address the endpoint.
    #[error("Invalid store endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Errors from the identity service (GoTrue).
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity service answered with a non-success status.
    #[error("Identity service rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Verification succeeded but no user came back.
    #[error("No identity in verification response")]
    MissingIdentity,

    /// The configured store URL cannot address the endpoint.
    #[error("Invalid identity endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Reduce an upstream error body to a single message.
///
/// PostgREST uses `message`, GoTrue uses `msg` or `error_description`
/// depending on the endpoint. Falls back to the raw body.
pub(crate) fn upstream_message(body: &str) -> String {
    const FIELDS: [&str; 4] = ["message", "msg", "error_description", "error"];

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(|v| v.as_str()))
        {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
