use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

/// Open the connection pool for `url` and bring the schema up to date.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("parse database url {}", url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;

    migrate(&db).await?;
    Ok(db)
}

/// Private in-memory database. A single connection that never idles out,
/// since the data lives only as long as that connection does.
pub async fn in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .context("parse in-memory url")?
        .foreign_keys(true);

    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("open in-memory database")?;

    migrate(&db).await?;
    Ok(db)
}

async fn migrate(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_database_has_schema() {
        let db = in_memory().await.expect("open db");
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .expect("list tables");
        assert_eq!(tables, vec!["project_files", "projects", "users"]);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = in_memory().await.expect("open db");
        let res = sqlx::query(
            "INSERT INTO projects (title, description, created_at, user_id, folder_token) VALUES ('t', 'd', '2025-01-01 00:00:00', 42, 'tok')",
        )
        .execute(&db)
        .await;
        assert!(res.is_err(), "project without owner must be rejected");
    }

    #[tokio::test]
    async fn file_database_is_created_on_connect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("app.db").display());
        let db = connect(&url).await.expect("connect");
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .expect("count");
        assert_eq!(users, 0);
        db.close().await;
    }
}
