use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::error::AuthError;
use crate::auth::store::{Principal, Role};
use crate::state::AppState;

/// Splits `Bearer <token>` out of an Authorization header. The scheme is
/// case-sensitive per RFC 6750's canonical form.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.filter(|h| !h.is_empty()).ok_or(AuthError::NoToken)?;
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or("");
    let token = parts.next().unwrap_or("");
    if scheme != "Bearer" {
        return Err(AuthError::UnsupportedScheme);
    }
    if token.is_empty() {
        return Err(AuthError::NoToken);
    }
    Ok(token)
}

/// Role gate: pure predicate, layered after the access-token guard.
pub fn require_roles(principal: &Principal, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Access-token guard. Rejection short-circuits the handler.
pub struct AuthUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let principal = state.auth.authenticate_access_token(header).await?;
        Ok(AuthUser(principal))
    }
}

/// Refresh-token guard, used only by the refresh and sign-out routes. Checks
/// the presented token against the stored hash, which is what makes rotation
/// stick: a superseded token still carries a valid signature but no longer
/// matches.
pub struct RefreshUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for RefreshUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let principal = state.auth.authenticate_refresh_token(header).await?;
        Ok(RefreshUser(principal))
    }
}
