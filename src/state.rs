use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::TokenKeys;
use crate::auth::password::Hasher;
use crate::auth::repo::PgUserStore;
use crate::auth::service::AuthService;
use crate::auth::store::UserStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        Self::from_parts(db, config)
    }

    /// All wiring happens here, once, at startup. Nothing constructs its own
    /// store or keys on first use.
    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let keys = TokenKeys::from_config(&config.auth);
        let hasher = Hasher::new(
            config.auth.argon2_m_cost_kib,
            config.auth.argon2_t_cost,
            config.auth.argon2_p_cost,
        )?;

        Ok(Self {
            db,
            config,
            auth: AuthService::new(users, keys, hasher),
        })
    }
}
