use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use super::{
    dto::UploadForm,
    repo_types::AttachmentId,
    services::{attach_files, resolve_download, UploadReport},
};
use crate::{
    auth::extractors::AuthUser, error::AppError, projects::repo_types::ProjectId, state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/files/:id/download", get(download_file))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/projects/:id/files", post(upload_files)) // multipart files[]
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub fn project_location(project_id: ProjectId) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&format!("/api/v1/projects/{}", project_id)) {
        headers.insert(header::LOCATION, v);
    }
    headers
}

/// POST /projects/:id/files (multipart, owner only)
#[instrument(skip(state, mp))]
pub async fn upload_files(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(project_id): Path<ProjectId>,
    mp: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<UploadReport>), AppError> {
    let form = UploadForm::from_multipart(mp).await?;
    if form.files.is_empty() {
        return Err(AppError::Validation("files[] is required".into()));
    }

    let report = attach_files(&state, project_id, user_id, form.files).await?;
    if report.uploaded.is_empty() {
        return Err(AppError::Validation(format!(
            "none of the {} files could be stored",
            report.failed
        )));
    }

    Ok((StatusCode::CREATED, project_location(project_id), Json(report)))
}

/// GET /files/:id/download
#[instrument(skip(state))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<AttachmentId>,
) -> Result<impl IntoResponse, AppError> {
    let dl = resolve_download(&state, id).await?;
    let file = tokio::fs::File::open(&dl.path)
        .await
        .map_err(anyhow::Error::new)?;
    let body = Body::from_stream(ReaderStream::new(file));

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", dl.filename))
        .map_err(anyhow::Error::new)?;
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, body))
}
