use std::sync::Arc;

use curricula_config::{CorsConfig, OAuthConfig, SessionConfig};
use curricula_db::{init_db_pool, run_migrations};
use tracing::error;

use crate::identity::{IdentityProvider, OAuthIdentityProvider};
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub session_config: SessionConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        session_config: SessionConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            store,
            identity,
            session_config,
            cors_config,
        }
    }
}

/// Connects to PostgreSQL, applies migrations and loads configuration.
///
/// Fails when `SESSION_SECRET` is not set.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let session_config = SessionConfig::from_env();
    if session_config.uses_default_secret() {
        error!("SESSION_SECRET is not set; refusing to sign sessions with the placeholder secret");
        anyhow::bail!("SESSION_SECRET must be set");
    }

    let pool = init_db_pool().await?;
    run_migrations(&pool).await?;

    let identity = OAuthIdentityProvider::new(OAuthConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to build identity provider: {e}"))?;

    Ok(AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(identity),
        session_config,
        CorsConfig::from_env(),
    ))
}
