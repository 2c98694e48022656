use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::TokenPair;
use crate::auth::error::AuthError;
use crate::auth::guards::parse_bearer;
use crate::auth::jwt::TokenKeys;
use crate::auth::password::Hasher;
use crate::auth::store::{Principal, UserStore};

/// Orchestrates the session lifecycle: sign-up, sign-in, rotation, sign-out,
/// and the request-time token checks. Session state per user is a single
/// stored refresh-token hash: present = active session, null = signed out.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: TokenKeys,
    hasher: Hasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: TokenKeys, hasher: Hasher) -> Self {
        Self {
            store,
            keys,
            hasher,
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        // Duplicate check first, before any hashing work is spent.
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        let hash = self.hasher.hash_password(password)?;
        let user = self.store.create_user(email, name, &hash).await?;
        info!(user_id = %user.id, "user signed up");
        Ok(user.into())
    }

    /// Unknown email and wrong password collapse into one error value, so the
    /// response never reveals which accounts exist.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.store.find_user_by_email(email).await? {
            Some(u) => u,
            None => {
                warn!("sign-in with unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        let pair = self.issue_session(user.id).await?;
        info!(user_id = %user.id, "user signed in");
        Ok(pair)
    }

    /// Rotation-on-use: the caller was already vetted by the refresh guard;
    /// issuing a new pair overwrites the stored hash and kills the token that
    /// was just presented.
    pub async fn renew_tokens(&self, user: &Principal) -> Result<TokenPair, AuthError> {
        let pair = self.issue_session(user.id).await?;
        info!(user_id = %user.id, "tokens renewed");
        Ok(pair)
    }

    /// Idempotent: signing out an already-signed-out user succeeds.
    pub async fn sign_out(&self, user_id: Uuid) -> Result<Uuid, AuthError> {
        self.store.clear_refresh_token_hash(user_id).await?;
        info!(user_id = %user_id, "user signed out");
        Ok(user_id)
    }

    pub async fn authenticate_access_token(
        &self,
        header: Option<&str>,
    ) -> Result<Principal, AuthError> {
        let token = parse_bearer(header)?;
        let claims = self.keys.verify_access(token)?;
        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        Ok(user.into())
    }

    pub async fn authenticate_refresh_token(
        &self,
        header: Option<&str>,
    ) -> Result<Principal, AuthError> {
        let token = parse_bearer(header)?;
        let claims = self.keys.verify_refresh(token)?;
        let valid = match self.store.find_refresh_token_hash(claims.sub).await? {
            Some(stored) => self.hasher.verify_token(token, &stored)?,
            None => false,
        };
        if !valid {
            // Superseded by a later rotation, or cleared by sign-out.
            warn!(user_id = %claims.sub, "refresh with discarded token");
            return Err(AuthError::DiscardedToken);
        }
        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        Ok(user.into())
    }

    /// Issues a fresh pair and rotates the stored refresh hash in a single
    /// atomic upsert. Concurrent calls race on that write; the last writer's
    /// refresh token is the only one left valid.
    async fn issue_session(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access_token = self.keys.sign_access(user_id)?;
        let refresh_token = self.keys.sign_refresh(user_id)?;
        let hash = self.hasher.hash_token(&refresh_token)?;
        self.store.upsert_refresh_token_hash(user_id, &hash).await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{Role, UserRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct MemStore {
        users: Mutex<HashMap<Uuid, UserRecord>>,
        hashes: Mutex<HashMap<Uuid, Option<String>>>,
    }

    impl MemStore {
        fn remove_user(&self, id: Uuid) {
            self.users.lock().unwrap().remove(&id);
        }
    }

    #[async_trait]
    impl UserStore for MemStore {
        async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            name: &str,
            password_hash: &str,
        ) -> anyhow::Result<UserRecord> {
            let now = OffsetDateTime::now_utc();
            let user = UserRecord {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                role: Role::Applicant,
                created_at: now,
                updated_at: now,
            };
            self.users.lock().unwrap().insert(user.id, user.clone());
            Ok(user)
        }

        async fn upsert_refresh_token_hash(
            &self,
            user_id: Uuid,
            hash: &str,
        ) -> anyhow::Result<()> {
            self.hashes
                .lock()
                .unwrap()
                .insert(user_id, Some(hash.to_string()));
            Ok(())
        }

        async fn find_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<Option<String>> {
            Ok(self
                .hashes
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .flatten())
        }

        async fn clear_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<()> {
            self.hashes.lock().unwrap().insert(user_id, None);
            Ok(())
        }
    }

    fn service() -> (AuthService, Arc<MemStore>) {
        let store = Arc::new(MemStore::default());
        let keys = TokenKeys::new(
            "access-secret",
            "refresh-secret",
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        );
        let hasher = Hasher::new(1024, 1, 1).expect("test params");
        (AuthService::new(store.clone(), keys, hasher), store)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn sign_up_returns_public_user() {
        let (svc, _) = service();
        let user = svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "A");
        assert_eq!(user.role, Role::Applicant);
        // The serialized principal carries no password material.
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let (svc, _) = service();
        svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let err = svc.sign_up("a@x.com", "B", "password2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn sign_in_failures_are_indistinguishable() {
        let (svc, _) = service();
        svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");

        let unknown_email = svc.sign_in("b@x.com", "password1").await.unwrap_err();
        let wrong_password = svc.sign_in("a@x.com", "password2").await.unwrap_err();

        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert_eq!(unknown_email.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn refresh_token_authenticates_after_sign_in() {
        let (svc, _) = service();
        let user = svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let pair = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        let principal = svc
            .authenticate_refresh_token(Some(&bearer(&pair.refresh_token)))
            .await
            .expect("refresh token should authenticate");
        assert_eq!(principal.id, user.id);
    }

    #[tokio::test]
    async fn rotation_invalidates_previous_refresh_token() {
        let (svc, _) = service();
        svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let first = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        let principal = svc
            .authenticate_refresh_token(Some(&bearer(&first.refresh_token)))
            .await
            .expect("first refresh token valid");
        let second = svc.renew_tokens(&principal).await.expect("renew");

        let err = svc
            .authenticate_refresh_token(Some(&bearer(&first.refresh_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DiscardedToken));

        svc.authenticate_refresh_token(Some(&bearer(&second.refresh_token)))
            .await
            .expect("rotated refresh token valid");
    }

    #[tokio::test]
    async fn sign_in_rotates_stored_hash() {
        let (svc, _) = service();
        svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let first = svc.sign_in("a@x.com", "password1").await.expect("first sign in");
        svc.sign_in("a@x.com", "password1").await.expect("second sign in");

        let err = svc
            .authenticate_refresh_token(Some(&bearer(&first.refresh_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DiscardedToken));
    }

    #[tokio::test]
    async fn sign_out_discards_refresh_token_and_is_idempotent() {
        let (svc, _) = service();
        let user = svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let pair = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        assert_eq!(svc.sign_out(user.id).await.expect("sign out"), user.id);
        let err = svc
            .authenticate_refresh_token(Some(&bearer(&pair.refresh_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DiscardedToken));

        // Already signed out: still succeeds.
        svc.sign_out(user.id).await.expect("repeat sign out");
    }

    #[tokio::test]
    async fn access_guard_rejects_refresh_signed_token() {
        let (svc, _) = service();
        svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let pair = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        let err = svc
            .authenticate_access_token(Some(&bearer(&pair.refresh_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn access_token_resolves_principal() {
        let (svc, _) = service();
        let user = svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let pair = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        let principal = svc
            .authenticate_access_token(Some(&bearer(&pair.access_token)))
            .await
            .expect("access token should authenticate");
        assert_eq!(principal.id, user.id);
    }

    #[tokio::test]
    async fn deleted_subject_is_unknown_user() {
        let (svc, store) = service();
        let user = svc.sign_up("a@x.com", "A", "password1").await.expect("sign up");
        let pair = svc.sign_in("a@x.com", "password1").await.expect("sign in");

        store.remove_user(user.id);
        let err = svc
            .authenticate_access_token(Some(&bearer(&pair.access_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        // sign-up -> sign-in -> refresh -> sign-out -> refresh with old token.
        let (svc, _) = service();
        let user = svc.sign_up("a@x.com", "A", "pw1-long-enough").await.expect("sign up");
        let signed_in = svc.sign_in("a@x.com", "pw1-long-enough").await.expect("sign in");

        let principal = svc
            .authenticate_refresh_token(Some(&bearer(&signed_in.refresh_token)))
            .await
            .expect("refresh guard");
        let renewed = svc.renew_tokens(&principal).await.expect("renew");

        svc.sign_out(user.id).await.expect("sign out");

        let err = svc
            .authenticate_refresh_token(Some(&bearer(&renewed.refresh_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DiscardedToken));
    }
}
