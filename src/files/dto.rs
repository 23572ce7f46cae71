use std::collections::HashMap;

use axum::extract::Multipart;

use super::services::UploadItem;
use crate::error::AppError;

/// A parsed multipart form: file parts named `files`/`files[]`, everything else as text.
#[derive(Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadItem>,
}

impl UploadForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = mp.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "files" || name == "files[]" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let body = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if filename.is_empty() {
                    continue;
                }
                form.files.push(UploadItem { filename, body });
            } else {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Builds real multipart requests for handler tests.
#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::Body,
        extract::{FromRequest, Multipart},
        http::{header, Request},
    };

    const BOUNDARY: &str = "projecthub-form-boundary";

    /// Field name, filename for file parts, payload.
    pub type Part<'a> = (&'a str, Option<&'a str>, &'a str);

    pub async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = String::new();
        for (name, filename, data) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(data);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }
}
