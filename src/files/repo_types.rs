use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::projects::repo_types::ProjectId;

pub type AttachmentId = i64;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attachment {
    pub id: AttachmentId,
    pub filename: String,
    /// `<folder token>/<filename>`, relative to the uploads root.
    #[serde(skip_serializing)]
    pub filepath: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    pub project_id: ProjectId,
}
