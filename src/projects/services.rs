//! Project store: creation with its attachment folder, listings and stars.

use sqlx::SqlitePool;
use tracing::{error, info};

use super::{
    dto::{NewProject, ProjectListing},
    languages,
    repo::{self, InsertProject},
    repo_types::{Project, ProjectId},
};
use crate::{auth::repo_types::UserId, error::AppError, state::AppState, storage::new_folder_token};

const MAX_TITLE_CHARS: usize = 200;

/// Creates the project folder first, then the row, so a row never points at a
/// missing folder. A failed insert leaves an empty orphan folder behind.
pub async fn create_project(
    state: &AppState,
    owner: UserId,
    input: NewProject,
) -> Result<Project, AppError> {
    let title = input.title.trim();
    let description = input.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(AppError::Validation(
            "title and description are required".into(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    let repository_url = input
        .repository_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let langs = languages::render(&languages::parse(&input.languages));

    // Reject before touching the file system.
    crate::auth::services::get_user(&state.db, owner).await?;

    let folder_token = new_folder_token();
    state.files.create_folder(&folder_token).await?;

    let row = repo::insert(
        &state.db,
        InsertProject {
            owner,
            title,
            description,
            repository_url,
            languages: &langs,
            folder_token: &folder_token,
        },
    )
    .await
    .map_err(|e| {
        error!(error = %e, %folder_token, "project insert failed; folder left orphaned");
        AppError::from(e)
    })?;

    info!(project_id = row.id, owner, %folder_token, "project created");
    Ok(row.into())
}

pub async fn list_all(db: &SqlitePool) -> Result<Vec<ProjectListing>, AppError> {
    let rows = repo::list_all(db).await?;
    Ok(rows.into_iter().map(ProjectListing::from).collect())
}

pub async fn list_by_owner(db: &SqlitePool, owner: UserId) -> Result<Vec<ProjectListing>, AppError> {
    let rows = repo::list_by_owner(db, owner).await?;
    Ok(rows.into_iter().map(ProjectListing::from).collect())
}

pub async fn get_by_id(db: &SqlitePool, id: ProjectId) -> Result<Project, AppError> {
    repo::find_by_id(db, id)
        .await?
        .map(Project::from)
        .ok_or(AppError::NotFound("project"))
}

/// Adds one star and returns the new count. Open to anonymous callers.
pub async fn increment_star(db: &SqlitePool, id: ProjectId) -> Result<i64, AppError> {
    let stars = repo::increment_stars(db, id)
        .await?
        .ok_or(AppError::NotFound("project"))?;
    info!(project_id = id, stars, "project starred");
    Ok(stars)
}
