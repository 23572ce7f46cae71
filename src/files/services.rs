//! Attachment store: owner-gated uploads and download resolution.

use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use super::{
    repo,
    repo_types::{Attachment, AttachmentId},
    sanitize::secure_filename,
};
use crate::{
    access,
    auth::repo_types::UserId,
    error::AppError,
    projects::{self, repo_types::ProjectId},
    state::AppState,
    storage::relative_path,
};

pub struct UploadItem {
    pub filename: String,
    pub body: Bytes,
}

/// Aggregate outcome of a batch. Files stored before a failure stay stored.
#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<Attachment>,
    pub failed: usize,
}

#[derive(Debug)]
pub struct Download {
    pub path: PathBuf,
    pub filename: String,
}

pub async fn attach_files(
    st: &AppState,
    project_id: ProjectId,
    actor: UserId,
    items: Vec<UploadItem>,
) -> Result<UploadReport, AppError> {
    let project = projects::services::get_by_id(&st.db, project_id).await?;
    if let Err(e) = access::require_manage(actor, &project) {
        warn!(project_id, actor, owner = project.owner_id, "upload by non-owner refused");
        return Err(e);
    }

    let mut report = UploadReport::default();
    for item in items {
        match store_one(st, project_id, &project.folder_token, item).await {
            Ok(att) => report.uploaded.push(att),
            Err(e) => {
                report.failed += 1;
                match &e {
                    AppError::Internal(_) => error!(error = %e, project_id, "attachment failed"),
                    _ => warn!(error = %e, project_id, "attachment rejected"),
                }
            }
        }
    }

    info!(
        project_id,
        uploaded = report.uploaded.len(),
        failed = report.failed,
        "files attached"
    );
    Ok(report)
}

async fn store_one(
    st: &AppState,
    project_id: ProjectId,
    folder_token: &str,
    item: UploadItem,
) -> Result<Attachment, AppError> {
    let filename = secure_filename(&item.filename)?;
    let rel = relative_path(folder_token, &filename);
    // Same name twice in a project: the later write wins on disk.
    st.files.write(&rel, item.body).await?;
    let att = repo::insert_attachment(&st.db, project_id, &filename, &rel).await?;
    Ok(att)
}

pub async fn list_for_project(db: &SqlitePool, project_id: ProjectId) -> Result<Vec<Attachment>, AppError> {
    Ok(repo::list_by_project(db, project_id).await?)
}

/// Absolute path and display name for an attachment, re-validated against the uploads root.
pub async fn resolve_download(st: &AppState, id: AttachmentId) -> Result<Download, AppError> {
    let att = repo::find_by_id(&st.db, id)
        .await?
        .ok_or(AppError::NotFound("attachment"))?;

    let path = st.files.resolve(&att.filepath).await.map_err(|e| {
        if matches!(e, AppError::InvalidPath) {
            warn!(attachment_id = id, filepath = %att.filepath, "refusing to serve attachment outside uploads root");
        }
        e
    })?;

    Ok(Download {
        path,
        filename: att.filename,
    })
}
