use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Auth failure taxonomy. Every variant except `Internal` is a normal,
/// client-recoverable condition.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication token required")]
    NoToken,
    #[error("unsupported authentication scheme")]
    UnsupportedScheme,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token discarded")]
    DiscardedToken,
    #[error("unknown user")]
    UnknownUser,
    #[error("forbidden")]
    Forbidden,
    #[error("hashing error: {0}")]
    Hashing(&'static str),
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::NoToken
            | AuthError::UnsupportedScheme
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::DiscardedToken
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Hashing(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        // Internal detail stays in the logs, never in the response body.
        let message = match &self {
            AuthError::Internal(e) => {
                error!(error = %e, "internal auth failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "status": status.as_u16(), "message": message }));
        (status, body).into_response()
    }
}
