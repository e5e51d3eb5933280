//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router
//! with in-memory upstream doubles, plus a mock Supabase backend for exercising the
//! real reqwest clients.
//!
//! ## Upstream Doubles
//!
//! [`RecordingStore`] records every privileged call in order and can be told to fail
//! specific tables or the auth-account delete. [`StubIdentity`] maps tokens to
//! identities.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] to serve a router on a random port, and
//! [`MockSupabase`] for a stand-in PostgREST/GoTrue backend.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::{Path, RawQuery, State};
use axum::http::{self, HeaderMap, Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use http_body_util::BodyExt;
use plank_common::{CallerIdentity, DependentTable, UserId};
use plank_server::api::{create_router, AppState, AppStateConfig, CorsPolicy};
use plank_server::config::Config;
use plank_server::upstream::{
    IdentityError, PrivilegedStoreClient, StoreError, UserScopedIdentityClient,
};
use serde_json::json;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Token the default [`StubIdentity`] accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// Identity behind [`VALID_TOKEN`].
pub const CAPTAIN_ID: &str = "9b2f4a5e-1c3d-4e6f-8a7b-0c1d2e3f4a5b";

// ============================================================================
// Upstream doubles
// ============================================================================

/// A privileged call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    DeleteWhere {
        table: DependentTable,
        owner: UserId,
    },
    DeleteAccount(UserId),
}

/// In-memory privileged client that records calls in order.
///
/// Auth accounts behave like GoTrue: deleting one that is already gone fails.
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    failing_tables: Mutex<HashSet<DependentTable>>,
    fail_account_delete: Mutex<bool>,
    deleted_accounts: Mutex<HashSet<UserId>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make deletes against `table` fail.
    pub fn fail_table(&self, table: DependentTable) {
        self.failing_tables.lock().unwrap().insert(table);
    }

    /// Make the auth-account delete fail.
    pub fn fail_account_delete(&self) {
        *self.fail_account_delete.lock().unwrap() = true;
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Tables hit by `delete_where`, in order.
    pub fn deleted_tables(&self) -> Vec<DependentTable> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::DeleteWhere { table, .. } => Some(table),
                StoreCall::DeleteAccount(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl PrivilegedStoreClient for RecordingStore {
    async fn delete_where(&self, table: DependentTable, owner: &UserId) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(StoreCall::DeleteWhere {
            table,
            owner: owner.clone(),
        });

        if self.failing_tables.lock().unwrap().contains(&table) {
            return Err(StoreError::Rejected {
                status: 500,
                message: format!("delete on {} failed", table.table()),
            });
        }
        Ok(())
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), IdentityError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::DeleteAccount(user_id.clone()));

        if *self.fail_account_delete.lock().unwrap() {
            return Err(IdentityError::Rejected {
                status: 500,
                message: "Database error deleting user".into(),
            });
        }
        if !self.deleted_accounts.lock().unwrap().insert(user_id.clone()) {
            return Err(IdentityError::Rejected {
                status: 404,
                message: "User not found".into(),
            });
        }
        Ok(())
    }
}

/// Token verification double.
pub struct StubIdentity {
    tokens: HashMap<String, CallerIdentity>,
    panic_on_verify: bool,
}

impl StubIdentity {
    /// Accepts [`VALID_TOKEN`] as [`CAPTAIN_ID`].
    pub fn new() -> Self {
        Self::default().with_token(VALID_TOKEN, CallerIdentity::new(CAPTAIN_ID))
    }

    /// Accepts nothing.
    pub fn rejecting() -> Self {
        Self::default()
    }

    /// Panics on every verification.
    pub fn panicking() -> Self {
        Self {
            panic_on_verify: true,
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: &str, identity: CallerIdentity) -> Self {
        self.tokens.insert(token.to_string(), identity);
        self
    }
}

impl Default for StubIdentity {
    fn default() -> Self {
        Self {
            tokens: HashMap::new(),
            panic_on_verify: false,
        }
    }
}

#[async_trait]
impl UserScopedIdentityClient for StubIdentity {
    async fn verify_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        assert!(!self.panic_on_verify, "identity service exploded");

        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                status: 401,
                message: "invalid JWT".into(),
            })
    }
}

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<RecordingStore>,
}

impl TestApp {
    /// Create a test app with a fresh [`RecordingStore`] and the default [`StubIdentity`].
    pub fn new() -> Self {
        Self::with_identity(StubIdentity::new())
    }

    /// Create a test app with a custom identity double.
    pub fn with_identity(identity: StubIdentity) -> Self {
        Self::with_parts(RecordingStore::new(), identity)
    }

    /// Create a test app around a prepared store.
    pub fn with_parts(store: Arc<RecordingStore>, identity: StubIdentity) -> Self {
        let config = Config::default_for_test();
        let state = AppState::new(AppStateConfig {
            store: store.clone(),
            identity: Arc::new(identity),
            cors: CorsPolicy::from_config(&config.cors).expect("Invalid test CORS config"),
        });

        Self {
            router: create_router(state),
            store,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Build an authorized request against the deletion endpoint.
    pub fn delete_request(token: &str) -> Request<Body> {
        Self::request(Method::POST, "/functions/v1/delete-user")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Collect a response body as raw text.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// Assert the static CORS header set is present.
pub fn assert_cors_headers<B>(response: &Response<B>) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
}

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}

// ============================================================================
// Mock Supabase backend
// ============================================================================

/// A request received by [`MockSupabase`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub prefer: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    users: Mutex<HashMap<String, serde_json::Value>>,
    deleted_users: Mutex<HashSet<String>>,
    rejected_tables: Mutex<HashSet<String>>,
}

/// Stand-in for the PostgREST and GoTrue endpoints of a Supabase project.
#[derive(Clone)]
pub struct MockSupabase {
    state: Arc<MockState>,
    pub anon_key: String,
    pub service_key: String,
}

impl MockSupabase {
    pub fn new() -> Self {
        let config = Config::default_for_test();
        Self {
            state: Arc::new(MockState::default()),
            anon_key: config.restricted_key,
            service_key: config.elevated_key,
        }
    }

    /// Register a user reachable with `token`.
    pub fn add_user(&self, token: &str, id: &str) {
        self.state.users.lock().unwrap().insert(
            token.to_string(),
            json!({
                "id": id,
                "aud": "authenticated",
                "role": "authenticated",
                "email": "captain@example.com",
            }),
        );
    }

    /// Register a token whose user payload has no ID.
    pub fn add_user_without_id(&self, token: &str) {
        self.state
            .users
            .lock()
            .unwrap()
            .insert(token.to_string(), json!({ "aud": "authenticated" }));
    }

    /// Make deletes against `table` fail with a PostgREST error.
    pub fn reject_table(&self, table: &str) {
        self.state
            .rejected_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Serve the mock on a random port.
    pub async fn spawn(&self) -> TestServer {
        let router = Router::new()
            .route("/auth/v1/user", get(mock_get_user))
            .route("/auth/v1/admin/users/{id}", delete(mock_delete_auth_user))
            .route("/rest/v1/{table}", delete(mock_delete_rows))
            .with_state(self.clone());
        spawn_test_server(router).await
    }

    fn record(&self, method: Method, path: String, query: Option<String>, headers: &HeaderMap, body: &Bytes) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.state.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query,
            apikey: header("apikey"),
            authorization: header("authorization"),
            prefer: header("prefer"),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    fn is_service_call(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.service_key);
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(self.service_key.as_str())
            && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
    }
}

async fn mock_get_user(State(mock): State<MockSupabase>, headers: HeaderMap) -> impl IntoResponse {
    mock.record(Method::GET, "/auth/v1/user".into(), None, &headers, &Bytes::new());

    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(mock.anon_key.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" })));
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    match mock.state.users.lock().unwrap().get(token) {
        Some(user) => (StatusCode::OK, Json(user.clone())),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "msg": "invalid JWT: unable to parse or verify signature" })),
        ),
    }
}

async fn mock_delete_rows(
    State(mock): State<MockSupabase>,
    Path(table): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    mock.record(Method::DELETE, format!("/rest/v1/{table}"), query, &headers, &body);

    if !mock.is_service_call(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "permission denied" }))).into_response();
    }
    if mock.state.rejected_tables.lock().unwrap().contains(&table) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "23503",
                "details": null,
                "hint": null,
                "message": format!("update or delete on table \"{table}\" violates foreign key constraint"),
            })),
        )
            .into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

async fn mock_delete_auth_user(
    State(mock): State<MockSupabase>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    mock.record(Method::DELETE, format!("/auth/v1/admin/users/{id}"), None, &headers, &body);

    if !mock.is_service_call(&headers) {
        return (StatusCode::FORBIDDEN, Json(json!({ "msg": "User not allowed" })));
    }
    if !mock.state.deleted_users.lock().unwrap().insert(id.clone()) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": 404, "error_code": "user_not_found", "msg": "User not found" })),
        );
    }

    (StatusCode::OK, Json(json!({ "id": id })))
}
