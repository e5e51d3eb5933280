//! Account Deletion Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plank_common::ErrorResponse;

use crate::upstream::IdentityError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("No authorization header")]
    AuthMissing,

    #[error("Unauthorized")]
    AuthInvalid,

    #[error("Failed to delete user account")]
    DeletionFailure(#[source] IdentityError),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::AuthMissing | Self::AuthInvalid => StatusCode::UNAUTHORIZED,
            Self::DeletionFailure(e) => {
                tracing::error!(error = %e, "Failed to delete auth user");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Delete user error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
