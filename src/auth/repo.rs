use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::store::{UserRecord, UserStore};

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn upsert_refresh_token_hash(&self, user_id: Uuid, hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET token_hash = EXCLUDED.token_hash, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(hash)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT token_hash FROM refresh_tokens WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(hash.flatten())
    }

    async fn clear_refresh_token_hash(&self, user_id: Uuid) -> anyhow::Result<()> {
        // No row is fine: sign-out is idempotent.
        sqlx::query(
            r#"
            UPDATE refresh_tokens SET token_hash = NULL, updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
