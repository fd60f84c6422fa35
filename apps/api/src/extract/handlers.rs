use axum::{extract::Multipart, Json};

use crate::errors::AppError;
use crate::extract::upload::UploadForm;
use crate::extract::{extract_upload, Extraction};

/// POST /api/v1/extract
///
/// Returns the text extracted from the uploaded resume and a short preview.
/// A file that cannot be parsed still answers 200, with empty text and a warning.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<Extraction>, AppError> {
    let mut form = UploadForm::from_multipart(multipart).await?;
    let upload = form.require_file()?;
    Ok(Json(extract_upload(&upload).await))
}
