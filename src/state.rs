use crate::config::AppConfig;
use crate::db;
use crate::storage::{FileStore, LocalFileStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = db::connect(&config.database_url).await?;

        let store = LocalFileStore::open(&config.uploads_dir).await?;
        tracing::info!(
            database = %config.database_url,
            uploads = %store.root().display(),
            "state initialized"
        );
        let files = Arc::new(store) as Arc<dyn FileStore>;

        Ok(Self::from_parts(db, config, files))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, files: Arc<dyn FileStore>) -> Self {
        Self { db, config, files }
    }

    /// Isolated state: in-memory database, uploads under `uploads_dir`.
    #[cfg(test)]
    pub async fn for_tests(uploads_dir: &std::path::Path) -> Self {
        let db = db::in_memory().await.expect("in-memory db");
        let files = Arc::new(
            LocalFileStore::open(uploads_dir)
                .await
                .expect("uploads dir"),
        ) as Arc<dyn FileStore>;

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            uploads_dir: uploads_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
        });

        Self { db, config, files }
    }
}
