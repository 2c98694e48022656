use crate::state::AppState;
use axum::Router;

pub(crate) mod claims;
pub mod dto;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod service;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::user_routes())
}
