use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::repo_types::{Attachment, AttachmentId};
use crate::projects::repo_types::ProjectId;

/// Append one attachment row.
pub async fn insert_attachment(
    db: &SqlitePool,
    project_id: ProjectId,
    filename: &str,
    filepath: &str,
) -> anyhow::Result<Attachment> {
    let row = sqlx::query_as::<_, Attachment>(
        r#"
        INSERT INTO project_files (filename, filepath, uploaded_at, project_id)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, filename, filepath, uploaded_at, project_id
        "#,
    )
    .bind(filename)
    .bind(filepath)
    .bind(OffsetDateTime::now_utc())
    .bind(project_id)
    .fetch_one(db)
    .await
    .context("insert attachment")?;

    Ok(row)
}

// ---- Queries ----

/// All attachments of a project, oldest first.
pub async fn list_by_project(db: &SqlitePool, project_id: ProjectId) -> anyhow::Result<Vec<Attachment>> {
    let rows = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT id, filename, filepath, uploaded_at, project_id
          FROM project_files
         WHERE project_id = ?1
         ORDER BY julianday(uploaded_at) ASC, id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(db)
    .await
    .context("list attachments by project")?;

    Ok(rows)
}

pub async fn find_by_id(db: &SqlitePool, id: AttachmentId) -> anyhow::Result<Option<Attachment>> {
    let row = sqlx::query_as::<_, Attachment>(
        r#"
        SELECT id, filename, filepath, uploaded_at, project_id
          FROM project_files
         WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("get attachment by id")?;

    Ok(row)
}
