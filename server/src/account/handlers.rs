//! Account Deletion HTTP Handler

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use plank_common::DeleteAccountResponse;

use super::error::AccountError;
use super::purge::purge_dependent_records;
use crate::api::AppState;
use crate::upstream::IdentityError;

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively and may be followed by any ASCII
/// whitespace. Anything else, including a value that is not visible ASCII,
/// yields `None`.
pub(crate) fn bearer_token(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(|c: char| c.is_ascii_whitespace())?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Delete the calling user's account and everything it owns.
///
/// Accepts any method; `OPTIONS` is answered as a CORS preflight.
///
/// 1. Verify the bearer token with the user-scoped identity client
/// 2. Purge dependent rows (reviews, trades, voyage logs, wishlist, cart, profile)
/// 3. Delete the auth account with the privileged client
pub async fn delete_user(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AccountError> {
    if method == Method::OPTIONS {
        return Ok((StatusCode::OK, "ok").into_response());
    }

    // An empty value counts as no header at all
    let header = headers
        .get(AUTHORIZATION)
        .filter(|value| !value.as_bytes().is_empty())
        .ok_or(AccountError::AuthMissing)?;
    let token = bearer_token(header).ok_or(AccountError::AuthInvalid)?;

    let caller = state
        .identity
        .verify_token(token)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidEndpoint(detail) => AccountError::Internal(detail),
            other => {
                tracing::debug!(error = %other, "Token verification failed");
                AccountError::AuthInvalid
            }
        })?;

    tracing::info!(user_id = %caller.id, "Processing account deletion");

    let report = purge_dependent_records(state.store.as_ref(), &caller.id).await;
    report.log();

    state
        .store
        .delete_account(&caller.id)
        .await
        .map_err(AccountError::DeletionFailure)?;

    tracing::info!(user_id = %caller.id, clean = report.is_clean(), "Account deletion completed");

    Ok(Json(DeleteAccountResponse::deleted()).into_response())
}
