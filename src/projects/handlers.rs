use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreatedProjectResponse, NewProject, ProjectDetails, ProjectListing, StarResponse},
    repo_types::ProjectId,
    services,
};
use crate::{
    access::Actor,
    auth::{self, extractors::AuthUser, repo_types::UserId},
    error::AppError,
    files::{self, dto::UploadForm, handlers::project_location, services::UploadReport},
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
        .route("/users/:id/projects", get(list_user_projects))
        // Starring is open to anonymous visitors on purpose.
        .route("/projects/:id/star", post(star_project))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project_multipart)) // multipart fields + files[]
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectListing>>, AppError> {
    Ok(Json(services::list_all(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectDetails>, AppError> {
    let project = services::get_by_id(&state.db, id).await?;
    let author = auth::services::get_user(&state.db, project.owner_id).await?;
    let files = files::services::list_for_project(&state.db, id).await?;
    Ok(Json(ProjectDetails {
        project,
        author: author.username,
        files,
    }))
}

#[instrument(skip(state))]
pub async fn list_user_projects(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<ProjectListing>>, AppError> {
    let user = auth::services::get_user(&state.db, user_id).await?;
    Ok(Json(services::list_by_owner(&state.db, user.id).await?))
}

/// POST /projects (multipart)
/// Fields: title, description, repository_url, languages; files[] optional.
#[instrument(skip(state, mp))]
pub async fn create_project_multipart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<CreatedProjectResponse>), AppError> {
    let mut form = UploadForm::from_multipart(mp).await?;
    let input = NewProject {
        title: form.take_field("title").unwrap_or_default(),
        description: form.take_field("description").unwrap_or_default(),
        repository_url: form.take_field("repository_url"),
        languages: form.take_field("languages").unwrap_or_default(),
    };

    let project = services::create_project(&state, user_id, input).await?;

    let upload = if form.files.is_empty() {
        UploadReport::default()
    } else {
        files::services::attach_files(&state, project.id, user_id, form.files).await?
    };

    Ok((
        StatusCode::CREATED,
        project_location(project.id),
        Json(CreatedProjectResponse { project, upload }),
    ))
}

/// POST /projects/:id/star -> `{"success": true, "stars": n}`
#[instrument(skip(state))]
pub async fn star_project(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<ProjectId>,
) -> Response {
    match services::increment_star(&state.db, id).await {
        Ok(stars) => {
            info!(?actor, project_id = id, stars, "star added");
            Json(StarResponse {
                success: true,
                stars: Some(stars),
            })
            .into_response()
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                e.into_response()
            } else {
                (
                    status,
                    Json(StarResponse {
                        success: false,
                        stars: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}
