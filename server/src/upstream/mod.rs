//! Upstream Services
//!
//! Capability traits for the two collaborators the deletion flow talks to,
//! plus their Supabase implementations.
//!
//! - [`PrivilegedStoreClient`] runs with the service-role key and may delete
//!   any row and any auth account.
//! - [`UserScopedIdentityClient`] runs with the anon key and only resolves a
//!   caller's token to an identity.

mod error;
mod supabase;

use async_trait::async_trait;
use plank_common::{CallerIdentity, DependentTable, UserId};

pub use error::{IdentityError, StoreError};
pub use supabase::{SupabaseIdentityClient, SupabaseStoreClient};

use crate::config::Config;

/// Data store and identity admin access under elevated credentials.
#[async_trait]
pub trait PrivilegedStoreClient: Send + Sync {
    /// Delete every row of `table` owned by `owner`.
    ///
    /// Deleting zero rows is a success.
    async fn delete_where(&self, table: DependentTable, owner: &UserId) -> Result<(), StoreError>;

    /// Delete the auth account itself.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), IdentityError>;
}

/// Token verification bound to the caller's own credentials.
#[async_trait]
pub trait UserScopedIdentityClient: Send + Sync {
    /// Resolve a bearer token to the identity it was issued for.
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError>;
}

/// Build the HTTP client shared by all upstream calls.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("plank-server/", env!("CARGO_PKG_VERSION")));

    if let Some(timeout) = config.upstream_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
