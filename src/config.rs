use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    pub argon2_m_cost_kib: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            access_ttl_minutes: env_or("ACCESS_TOKEN_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("REFRESH_TOKEN_TTL_MINUTES", 60 * 24 * 7),
            argon2_m_cost_kib: env_or("ARGON2_M_COST_KIB", 19456),
            argon2_t_cost: env_or("ARGON2_T_COST", 2),
            argon2_p_cost: env_or("ARGON2_P_COST", 1),
        };
        if auth.access_secret == auth.refresh_secret {
            anyhow::bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
        }
        Ok(Self { database_url, auth })
    }
}
