use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::instrument;

use crate::{
    auth::{
        dto::{SignInRequest, SignUpRequest, SignedOut, TokenPair},
        error::AuthError,
        guards::{AuthUser, RefreshUser},
        store::Principal,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/sign-out", post(sign_out))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Principal>), AuthError> {
    if !is_valid_email(&payload.email) {
        return Err(AuthError::Validation("invalid email"));
    }
    if payload.name.trim().is_empty() {
        return Err(AuthError::Validation("name is required"));
    }
    if payload.password.len() < 8 {
        return Err(AuthError::Validation("password must be at least 8 characters"));
    }

    let user = state
        .auth
        .sign_up(&payload.email, &payload.name, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.sign_in(&payload.email, &payload.password).await?;
    Ok(Json(pair))
}

#[instrument(skip(state, user))]
async fn refresh(
    State(state): State<AppState>,
    RefreshUser(user): RefreshUser,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.renew_tokens(&user).await?;
    Ok(Json(pair))
}

#[instrument(skip(state, user))]
async fn sign_out(
    State(state): State<AppState>,
    RefreshUser(user): RefreshUser,
) -> Result<Json<SignedOut>, AuthError> {
    let id = state.auth.sign_out(user.id).await?;
    Ok(Json(SignedOut { id }))
}

#[instrument(skip(user))]
async fn get_me(AuthUser(user): AuthUser) -> Json<Principal> {
    Json(user)
}
