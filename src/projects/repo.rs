use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::repo_types::{ProjectId, ProjectListingRow, ProjectRow};
use crate::auth::repo_types::UserId;

pub struct InsertProject<'a> {
    pub owner: UserId,
    pub title: &'a str,
    pub description: &'a str,
    pub repository_url: Option<&'a str>,
    pub languages: &'a str,
    pub folder_token: &'a str,
}

const LISTING_SELECT: &str = r#"
    SELECT p.id, p.title, p.description, p.repository_url, p.languages, p.created_at,
           p.user_id, p.stars, p.folder_token,
           u.username AS author,
           (SELECT COUNT(*) FROM project_files f WHERE f.project_id = p.id) AS attachment_count
      FROM projects p
      JOIN users u ON u.id = p.user_id
"#;

pub async fn insert(db: &SqlitePool, p: InsertProject<'_>) -> sqlx::Result<ProjectRow> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects (title, description, repository_url, languages, created_at, user_id, folder_token)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING id, title, description, repository_url, languages, created_at, user_id, stars, folder_token
        "#,
    )
    .bind(p.title)
    .bind(p.description)
    .bind(p.repository_url)
    .bind(p.languages)
    .bind(OffsetDateTime::now_utc())
    .bind(p.owner)
    .bind(p.folder_token)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: ProjectId) -> sqlx::Result<Option<ProjectRow>> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, title, description, repository_url, languages, created_at, user_id, stars, folder_token
          FROM projects
         WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Newest first; no pagination.
pub async fn list_all(db: &SqlitePool) -> sqlx::Result<Vec<ProjectListingRow>> {
    let sql = format!("{} ORDER BY julianday(p.created_at) DESC, p.id DESC", LISTING_SELECT);
    sqlx::query_as::<_, ProjectListingRow>(&sql).fetch_all(db).await
}

pub async fn list_by_owner(db: &SqlitePool, owner: UserId) -> sqlx::Result<Vec<ProjectListingRow>> {
    let sql = format!(
        "{} WHERE p.user_id = ?1 ORDER BY julianday(p.created_at) DESC, p.id DESC",
        LISTING_SELECT
    );
    sqlx::query_as::<_, ProjectListingRow>(&sql)
        .bind(owner)
        .fetch_all(db)
        .await
}

/// Single-statement increment; `None` when the project does not exist.
pub async fn increment_stars(db: &SqlitePool, id: ProjectId) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE projects
           SET stars = stars + 1
         WHERE id = ?1
        RETURNING stars
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
