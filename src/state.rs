use crate::auth::repo::UserStore;
use crate::config::AppConfig;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let users = UserStore::open(&config.users_file)
            .await
            .with_context(|| format!("open user store at {}", config.users_file.display()))?;

        Ok(Self::from_parts(config, Arc::new(users)))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<UserStore>) -> Self {
        Self { config, users }
    }

    /// State backed by a users file under `dir`, for tests.
    #[cfg(test)]
    pub async fn fake(dir: &std::path::Path) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: dir.join("users.json"),
            cors_origin: crate::config::DEFAULT_CORS_ORIGIN.into(),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                ttl_days: 7,
            },
        });
        let users = UserStore::open(&config.users_file)
            .await
            .expect("test user store");
        Self::from_parts(config, Arc::new(users))
    }
}
