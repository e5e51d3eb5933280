//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Default `Access-Control-Allow-Headers` value, matching what supabase-js sends.
pub const DEFAULT_CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Supabase project URL (e.g., `https://abc.supabase.co`)
    pub store_url: String,

    /// Service-role key. Bypasses row level security.
    pub elevated_key: String,

    /// Anon key. Only used to verify caller tokens.
    pub restricted_key: String,

    /// Timeout applied to every upstream request (unset = no explicit timeout)
    pub upstream_timeout: Option<Duration>,

    /// Static CORS headers merged into every response
    pub cors: CorsConfig,
}

/// CORS header values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// `Access-Control-Allow-Origin`
    pub allow_origin: String,
    /// `Access-Control-Allow-Headers`
    pub allow_headers: String,
    /// `Access-Control-Allow-Methods`
    pub allow_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".into(),
            allow_headers: DEFAULT_CORS_ALLOW_HEADERS.into(),
            allow_methods: "POST, OPTIONS".into(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing Supabase settings fall back to empty strings; requests then
    /// fail upstream instead of at startup.
    pub fn from_env() -> Result<Self> {
        let defaults = CorsConfig::default();

        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) if !raw.trim().is_empty() => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            )),
            _ => None,
        };

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            store_url: env::var("SUPABASE_URL").unwrap_or_default(),
            elevated_key: env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default(),
            restricted_key: env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            upstream_timeout,
            cors: CorsConfig {
                allow_origin: env::var("CORS_ALLOW_ORIGIN").unwrap_or(defaults.allow_origin),
                allow_headers: env::var("CORS_ALLOW_HEADERS").unwrap_or(defaults.allow_headers),
                allow_methods: env::var("CORS_ALLOW_METHODS").unwrap_or(defaults.allow_methods),
            },
        })
    }

    /// Check if all Supabase settings are present.
    #[must_use]
    pub fn has_store_credentials(&self) -> bool {
        !self.store_url.is_empty() && !self.elevated_key.is_empty() && !self.restricted_key.is_empty()
    }

    /// Create a default configuration for testing.
    ///
    /// Points at a local mock backend; integration tests override `store_url`
    /// with the address of their spawned server.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            store_url: "http://127.0.0.1:54321".into(),
            elevated_key: "test-service-role-key".into(),
            restricted_key: "test-anon-key".into(),
            upstream_timeout: Some(Duration::from_secs(5)),
            cors: CorsConfig::default(),
        }
    }
}
