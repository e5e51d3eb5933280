//! Supabase REST Clients
//!
//! Talks to the PostgREST data API (`/rest/v1`) and the GoTrue auth API
//! (`/auth/v1`) of a Supabase project over plain HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use plank_common::{CallerIdentity, DependentTable, UserId};
use reqwest::Url;
use serde_json::json;

use super::error::{upstream_message, IdentityError, StoreError};
use super::{PrivilegedStoreClient, UserScopedIdentityClient};

/// Resolve `path` against the project URL.
fn endpoint(base_url: &str, path: &str) -> Result<Url, String> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err("store URL is not configured".to_string());
    }

    Url::parse(&format!("{base}/{path}")).map_err(|e| format!("{base}: {e}"))
}

/// Service-role client for row deletes and auth admin calls.
#[derive(Clone)]
pub struct SupabaseStoreClient {
    inner: Arc<SupabaseStoreClientInner>,
}

struct SupabaseStoreClientInner {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStoreClient {
    /// Create a client that authenticates every call with the service-role key.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SupabaseStoreClientInner {
                http,
                base_url: base_url.into(),
                service_key: service_key.into(),
            }),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.inner.service_key.as_str())
            .bearer_auth(&self.inner.service_key)
    }
}

#[async_trait]
impl PrivilegedStoreClient for SupabaseStoreClient {
    async fn delete_where(&self, table: DependentTable, owner: &UserId) -> Result<(), StoreError> {
        let mut url = endpoint(&self.inner.base_url, &format!("rest/v1/{}", table.table()))
            .map_err(StoreError::InvalidEndpoint)?;
        url.query_pairs_mut()
            .append_pair(table.owner_column(), &format!("eq.{owner}"));

        let response = self
            .authorize(self.inner.http.delete(url))
            .header("Prefer", "return=minimal")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message: upstream_message(&body),
        })
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), IdentityError> {
        let mut url = endpoint(&self.inner.base_url, "auth/v1/admin/users")
            .map_err(IdentityError::InvalidEndpoint)?;
        url.path_segments_mut()
            .map_err(|()| IdentityError::InvalidEndpoint("store URL cannot be a base".to_string()))?
            .push(user_id.as_str());

        let response = self
            .authorize(self.inner.http.delete(url))
            .json(&json!({ "should_soft_delete": false }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Rejected {
            status: status.as_u16(),
            message: upstream_message(&body),
        })
    }
}

/// Anon-key client that verifies caller tokens.
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    inner: Arc<SupabaseIdentityClientInner>,
}

struct SupabaseIdentityClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityClient {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SupabaseIdentityClientInner {
                http,
                base_url: base_url.into(),
                anon_key: anon_key.into(),
            }),
        }
    }
}

#[async_trait]
impl UserScopedIdentityClient for SupabaseIdentityClient {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let url =
            endpoint(&self.inner.base_url, "auth/v1/user").map_err(IdentityError::InvalidEndpoint)?;

        let response = self
            .inner
            .http
            .get(url)
            .header("apikey", self.inner.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let identity: CallerIdentity = response
            .json()
            .await
            .map_err(|_| IdentityError::MissingIdentity)?;

        if identity.id.is_empty() {
            return Err(IdentityError::MissingIdentity);
        }

        Ok(identity)
    }
}
