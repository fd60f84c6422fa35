use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::latex::{CompileError, TemplateError};
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Empty resume: {0}")]
    EmptyResume(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model answered, but not with a compilable document.
    #[error("Generated LaTeX is missing document structure")]
    UnusableOutput { raw_output: String },

    #[error("PDF compilation failed: {error}")]
    Compilation { error: CompileError, latex: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Unknown(_) => AppError::Validation(err.to_string()),
            TemplateError::Missing { .. } => AppError::NotFound(err.to_string()),
            TemplateError::Io(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
                AppError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    None,
                ),
                AppError::EmptyResume(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_RESUME",
                    msg.clone(),
                    None,
                ),
                AppError::Llm(err) => {
                    tracing::error!("LLM error: {err}");
                    let code = match err {
                        LlmError::Http(_) => "LLM_UNAVAILABLE",
                        LlmError::Api { .. } => "LLM_API_ERROR",
                        LlmError::Format(_) => "LLM_FORMAT_ERROR",
                    };
                    (StatusCode::BAD_GATEWAY, code, err.to_string(), None)
                }
                AppError::UnusableOutput { raw_output } => {
                    tracing::warn!("Model output rejected: no \\begin{{document}} marker");
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "UNUSABLE_OUTPUT",
                        "Generated LaTeX is missing document structure. \
                         Nothing was compiled; please try again."
                            .to_string(),
                        Some(json!({ "raw_output": raw_output })),
                    )
                }
                AppError::Compilation {
                    error: error @ (CompileError::Spawn { .. } | CompileError::Workspace(_)),
                    ..
                } => {
                    tracing::error!("Compiler unavailable: {error}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "The PDF compiler is unavailable. Please try again later.".to_string(),
                        None,
                    )
                }
                AppError::Compilation { error, latex } => {
                    tracing::warn!("Compilation failed: {error}");
                    let diagnostic = error.diagnostic();
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "COMPILATION_FAILED",
                        "PDF compilation failed. Check LaTeX code for errors.".to_string(),
                        Some(json!({
                            "reason": error.to_string(),
                            "diagnostic": diagnostic,
                            "latex": latex,
                        })),
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
