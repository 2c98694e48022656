use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::auth::error::AuthError;

/// Upper bound on hashable input. Covers passwords and refresh-token strings
/// with plenty of headroom; anything bigger is a malformed request.
pub const MAX_SECRET_LEN: usize = 4096;

/// One-way hashing for passwords and for refresh tokens at rest. Refresh
/// tokens get the same treatment so the database never holds a usable bearer
/// token verbatim.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
}

impl Hasher {
    pub fn new(m_cost_kib: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost_kib, t_cost, p_cost, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash_password(&self, plain: &str) -> Result<String, AuthError> {
        self.hash(plain)
    }

    /// Mismatch is a normal `false`, never an error.
    pub fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, AuthError> {
        self.verify(plain, hash)
    }

    pub fn hash_token(&self, token: &str) -> Result<String, AuthError> {
        self.hash(token)
    }

    pub fn verify_token(&self, token: &str, hash: &str) -> Result<bool, AuthError> {
        self.verify(token, hash)
    }

    fn hash(&self, plain: &str) -> Result<String, AuthError> {
        check_input(plain)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash error");
                AuthError::Internal(anyhow::anyhow!(e.to_string()))
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            AuthError::Internal(anyhow::anyhow!(e.to_string()))
        })?;
        Ok(self.argon2.verify_password(plain.as_bytes(), &parsed).is_ok())
    }
}

fn check_input(plain: &str) -> Result<(), AuthError> {
    if plain.is_empty() {
        return Err(AuthError::Hashing("empty input"));
    }
    if plain.len() > MAX_SECRET_LEN {
        return Err(AuthError::Hashing("input too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> Hasher {
        // Low-cost params to keep the suite fast.
        Hasher::new(1024, 1, 1).expect("test params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash_password(password).expect("hashing should succeed");
        assert!(hasher
            .verify_password(password, &hash)
            .expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = test_hasher();
        let hash = hasher
            .hash_password("correct-horse-battery-staple")
            .expect("hashing should succeed");
        assert!(!hasher
            .verify_password("wrong-password", &hash)
            .expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let hasher = test_hasher();
        let err = hasher.verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[test]
    fn hash_rejects_empty_input() {
        let hasher = test_hasher();
        assert!(matches!(
            hasher.hash_password("").unwrap_err(),
            AuthError::Hashing(_)
        ));
    }

    #[test]
    fn hash_rejects_oversized_input() {
        let hasher = test_hasher();
        let huge = "x".repeat(MAX_SECRET_LEN + 1);
        assert!(matches!(
            hasher.hash_token(&huge).unwrap_err(),
            AuthError::Hashing(_)
        ));
    }

    #[test]
    fn token_hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let token = "header.payload.signature";
        let hash = hasher.hash_token(token).expect("hashing should succeed");
        assert!(hasher.verify_token(token, &hash).expect("verify should succeed"));
        assert!(!hasher
            .verify_token("header.payload.other", &hash)
            .expect("verify should not error"));
    }
}
