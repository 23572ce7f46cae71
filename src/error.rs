use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} already taken")]
    Conflict(&'static str),

    #[error("invalid credentials")]
    AuthFailure,

    #[error("authentication required")]
    AuthRequired,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("not allowed to manage this project")]
    Forbidden,

    #[error("path escapes the uploads directory")]
    InvalidPath,

    #[error("unusable filename: {0:?}")]
    InvalidFilename(String),

    #[error("{0}")]
    Validation(String),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AuthFailure | AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidPath | AppError::InvalidFilename(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Multipart(e) => e.status(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
