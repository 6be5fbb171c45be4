//! Service wiring: identity store, identity verifier, token issuer.

use std::sync::Arc;

use gatehouse_auth::{NewUser, TokenIssuer, hash_password};

use crate::config::AppConfig;

use super::google::{GoogleVerifier, HttpGoogleVerifier};
use super::store::{InMemoryUserStore, UserStore};

pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub google: Arc<dyn GoogleVerifier>,
    pub issuer: Arc<TokenIssuer>,
    pub rotate_refresh_tokens: bool,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let users: Arc<dyn UserStore> = if config.use_persistent_store {
        #[cfg(feature = "postgres")]
        {
            let url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORE=true")
            })?;
            Arc::new(super::store_pg::PostgresUserStore::connect(url).await?)
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORE=true but postgres feature not enabled, falling back to in-memory"
            );
            Arc::new(InMemoryUserStore::new())
        }
    } else {
        Arc::new(InMemoryUserStore::new())
    };

    let google: Arc<dyn GoogleVerifier> =
        Arc::new(HttpGoogleVerifier::new(config.google_userinfo_url.clone())?);

    let issuer = Arc::new(TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        config.access_ttl,
        config.refresh_ttl,
    ));

    Ok(AppServices {
        users,
        google,
        issuer,
        rotate_refresh_tokens: config.rotate_refresh_tokens,
    })
}

/// Seed the initial superuser when configured and not already present.
///
/// This is the only mechanism that grants the role flags; the HTTP surface
/// cannot set them.
pub async fn bootstrap_admin(services: &AppServices, config: &AppConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_ref(),
        config.bootstrap_admin_password.as_ref(),
    ) else {
        return Ok(());
    };

    if services.users.find_by_email(email).await?.is_some() {
        return Ok(());
    }

    let user = services
        .users
        .create(NewUser {
            email: email.clone(),
            password_hash: Some(hash_password(password)?),
            is_staff: true,
            is_superuser: true,
            ..Default::default()
        })
        .await?;

    tracing::info!(user_id = %user.id, "bootstrapped admin user");
    Ok(())
}
