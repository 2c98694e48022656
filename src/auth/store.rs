use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Recruiter,
}

/// Full user row, password hash included. Never leaves the auth module.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Public-safe projection of a user, attached to a request after token
/// verification. Built by projection, never by stripping a field in place.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for Principal {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Everything the auth core needs from the user store. Wired explicitly at
/// startup; the production impl lives in `repo.rs`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRecord>;

    /// Rotates the single stored refresh-token hash for the user. One atomic
    /// upsert; at most one valid hash per user at any time.
    async fn upsert_refresh_token_hash(&self, user_id: Uuid, hash: &str) -> anyhow::Result<()>;
    async fn find_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<Option<String>>;
    async fn clear_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<()>;
}
