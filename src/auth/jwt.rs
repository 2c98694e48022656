use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::config::AuthConfig;

/// Signs and verifies the two token families. Access and refresh use
/// independent secrets, so a token of one family never verifies as the other.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenKeys {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(
            &cfg.access_secret,
            &cfg.refresh_secret,
            Duration::from_secs((cfg.access_ttl_minutes as u64) * 60),
            Duration::from_secs((cfg.refresh_ttl_minutes as u64) * 60),
        )
    }

    pub fn sign_access(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = sign(&self.access_encoding, self.access_ttl, user_id)?;
        debug!(user_id = %user_id, "access token signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = sign(&self.refresh_encoding, self.refresh_ttl, user_id)?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.access_decoding, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.refresh_decoding, token)
    }
}

fn sign(key: &EncodingKey, ttl: Duration, user_id: Uuid) -> Result<String, AuthError> {
    let now = OffsetDateTime::now_utc();
    let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
    let claims = Claims {
        sub: user_id,
        iat: now.unix_timestamp() as usize,
        exp: exp.unix_timestamp() as usize,
    };
    encode(&Header::default(), &claims, key)
        .map_err(|e| AuthError::Internal(anyhow::Error::new(e)))
}

/// Expiry is the one failure the client can act on (refresh or re-login), so
/// it is kept distinct from every other verification failure.
fn verify(key: &DecodingKey, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    match decode::<Claims>(token, key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::TokenExpired),
        Err(_) => Err(AuthError::TokenInvalid),
    }
}
