//! Axum route handlers for the Enhancement API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::enhance::enhancer::{enhance_resume, render_latex, EnhanceInput};
use crate::errors::AppError;
use crate::extract::extract_upload;
use crate::extract::upload::UploadForm;
use crate::latex::TemplateName;
use crate::state::AppState;

pub const PDF_FILE_NAME: &str = "enhanced_resume.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateName>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub request_id: Uuid,
    pub template: TemplateName,
    pub resume_preview: String,
    pub latex: String,
    /// Inline preview; the same bytes `/api/v1/render` would return.
    pub pdf_base64: String,
    pub pdf_file_name: &'static str,
    /// Extraction problems and fields the model had to infer.
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub latex: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: TemplateName::ALL.to_vec(),
    })
}

/// POST /api/v1/enhance
///
/// Multipart fields: `file` (PDF or text resume), `job_description`,
/// `template` (Classic | Modern, default Classic), optional `company`, `position`.
pub async fn handle_enhance(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EnhanceResponse>, AppError> {
    let mut form = UploadForm::from_multipart(multipart).await?;
    let upload = form.require_file()?;

    let job_description = form
        .text("job_description")
        .ok_or_else(|| AppError::Validation("Please paste the job description.".to_string()))?
        .to_string();
    let template = match form.text("template") {
        Some(name) => name.parse::<TemplateName>()?,
        None => TemplateName::default(),
    };

    let request_id = Uuid::new_v4();
    info!(
        "[{request_id}] Enhance request: {} ({} bytes), template {template}",
        upload.display_name(),
        upload.data.len()
    );

    let extraction = extract_upload(&upload).await;
    if extraction.is_empty() {
        let reason = extraction
            .warnings
            .first()
            .cloned()
            .unwrap_or_else(|| "the file contains no text".to_string());
        return Err(AppError::EmptyResume(format!(
            "No text could be extracted from the uploaded resume: {reason}"
        )));
    }

    let company = form.text("company").map(str::to_string);
    let position = form.text("position").map(str::to_string);
    let mut warnings = extraction.warnings;
    for (field, value) in [("company", &company), ("position", &position)] {
        if value.is_none() {
            warnings.push(format!(
                "No {field} given; it was inferred from the job description."
            ));
        }
    }

    let input = EnhanceInput {
        resume_text: extraction.text,
        job_description,
        template,
        company,
        position,
    };
    let enhanced = enhance_resume(&state, &input, request_id).await?;

    Ok(Json(EnhanceResponse {
        request_id,
        template,
        resume_preview: extraction.preview,
        pdf_base64: STANDARD.encode(&enhanced.pdf),
        latex: enhanced.latex.into_inner(),
        pdf_file_name: PDF_FILE_NAME,
        warnings,
        generated_at: Utc::now(),
    }))
}

/// POST /api/v1/render
///
/// Compiles user-supplied (possibly edited) LaTeX and returns the PDF as a download.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    if request.latex.trim().is_empty() {
        return Err(AppError::Validation("latex cannot be empty".to_string()));
    }

    let (_, pdf) = render_latex(&state, &request.latex).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILE_NAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
