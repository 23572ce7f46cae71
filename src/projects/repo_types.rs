use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::languages::{self, LanguageShare};
use crate::auth::repo_types::UserId;

pub type ProjectId = i64;

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub repository_url: Option<String>,
    pub languages: String,
    pub created_at: OffsetDateTime,
    pub user_id: UserId,
    pub stars: i64,
    pub folder_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub repository_url: Option<String>,
    pub languages: Vec<LanguageShare>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub owner_id: UserId,
    pub stars: i64,
    #[serde(skip_serializing)]
    pub folder_token: String,
}

impl From<ProjectRow> for Project {
    fn from(r: ProjectRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            repository_url: r.repository_url,
            languages: languages::parse(&r.languages),
            created_at: r.created_at,
            owner_id: r.user_id,
            stars: r.stars,
            folder_token: r.folder_token,
        }
    }
}

/// A project joined with its author's name and its attachment count.
#[derive(Debug, FromRow)]
pub struct ProjectListingRow {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub repository_url: Option<String>,
    pub languages: String,
    pub created_at: OffsetDateTime,
    pub user_id: UserId,
    pub stars: i64,
    pub folder_token: String,
    pub author: String,
    pub attachment_count: i64,
}
