use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Token pair returned by sign-in and refresh. The refresh token exists in
/// plaintext only here, on its way to the client; the store keeps a hash.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response returned after sign-out.
#[derive(Debug, Serialize)]
pub struct SignedOut {
    pub id: Uuid,
}
