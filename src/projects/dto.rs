use serde::{Deserialize, Serialize};

use super::repo_types::{Project, ProjectListingRow, ProjectRow};
use crate::files::{repo_types::Attachment, services::UploadReport};

/// Fields of the create form; `languages` is the raw descriptor string.
#[derive(Debug, Default, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub languages: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectListing {
    #[serde(flatten)]
    pub project: Project,
    pub author: String,
    pub attachment_count: i64,
}

impl From<ProjectListingRow> for ProjectListing {
    fn from(r: ProjectListingRow) -> Self {
        let project = Project::from(ProjectRow {
            id: r.id,
            title: r.title,
            description: r.description,
            repository_url: r.repository_url,
            languages: r.languages,
            created_at: r.created_at,
            user_id: r.user_id,
            stars: r.stars,
            folder_token: r.folder_token,
        });
        Self {
            project,
            author: r.author,
            attachment_count: r.attachment_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub author: String,
    pub files: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub struct CreatedProjectResponse {
    pub project: Project,
    pub upload: UploadReport,
}

#[derive(Debug, Serialize)]
pub struct StarResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<i64>,
}
