use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

/// Multipart field carrying the resume file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

/// A parsed multipart form: at most one file plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == FILE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                form.file = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid field '{name}': {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed value of a text field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_file(&mut self) -> Result<Upload, AppError> {
        let upload = self.file.take().ok_or_else(|| {
            AppError::Validation(format!("Missing '{FILE_FIELD}' field with the resume upload"))
        })?;
        if upload.data.is_empty() {
            return Err(AppError::Validation("Uploaded resume is empty".to_string()));
        }
        Ok(upload)
    }
}
