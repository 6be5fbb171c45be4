//! Process configuration (environment-driven, read once at startup).

use anyhow::Context;
use chrono::Duration;

pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// When set, the refresh exchange also returns a rotated refresh token.
    pub rotate_refresh_tokens: bool,
    pub google_userinfo_url: String,
    pub use_persistent_store: bool,
    pub database_url: Option<String>,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            jwt_secret,
            access_ttl: Duration::seconds(env_parse("ACCESS_TTL_SECS", 15 * 60)?),
            refresh_ttl: Duration::seconds(env_parse("REFRESH_TTL_SECS", 7 * 24 * 3600)?),
            rotate_refresh_tokens: env_parse("ROTATE_REFRESH_TOKENS", false)?,
            google_userinfo_url: env_or("GOOGLE_USERINFO_URL", DEFAULT_GOOGLE_USERINFO_URL),
            use_persistent_store: env_parse("USE_PERSISTENT_STORE", false)?,
            database_url: std::env::var("DATABASE_URL").ok(),
            bootstrap_admin_email: std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            bootstrap_admin_password: std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
