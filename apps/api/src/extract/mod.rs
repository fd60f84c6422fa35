//! Content extraction: turns an uploaded resume (PDF or plain text) into text.
//!
//! Extraction never fails the request: a parse error is logged, surfaced as a
//! warning, and the text is left empty. Callers check `Extraction::is_empty`.

pub mod handlers;
pub mod upload;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::extract::upload::Upload;

/// Characters of resume text shown back to the user as a preview.
pub const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("Uploaded file is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub preview: String,
    pub truncated: bool,
    pub warnings: Vec<String>,
}

impl Extraction {
    fn from_text(text: String) -> Self {
        let (preview, truncated) = preview(&text, PREVIEW_CHARS);
        Self {
            text,
            preview,
            truncated,
            warnings: vec![],
        }
    }

    fn failed(err: &ExtractError) -> Self {
        Self {
            text: String::new(),
            preview: String::new(),
            truncated: false,
            warnings: vec![err.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// True when the declared media type says PDF, or the bytes carry the PDF magic.
pub fn is_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("application/pdf") || head.starts_with(b"%PDF-")
}

/// Extracts text synchronously. PDF parsing is CPU-bound; call from a blocking task.
pub fn extract_text(data: &[u8], content_type: Option<&str>) -> Result<String, ExtractError> {
    if is_pdf(content_type, data) {
        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        Ok(join_pages(&pages))
    } else {
        Ok(String::from_utf8(data.to_vec())?)
    }
}

/// Concatenates page texts, each followed by a newline.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (format!("{}...", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}

/// Extracts an upload off the async runtime. Failures (including a panicking
/// PDF parser) become a warning plus empty text.
pub async fn extract_upload(upload: &Upload) -> Extraction {
    let data = upload.data.clone();
    let content_type = upload.content_type.clone();

    let result = tokio::task::spawn_blocking(move || extract_text(&data, content_type.as_deref()))
        .await
        .unwrap_or_else(|e| Err(ExtractError::Pdf(format!("parser aborted: {e}"))));

    match result {
        Ok(text) => {
            info!(
                "Extracted {} chars from {}",
                text.chars().count(),
                upload.display_name()
            );
            Extraction::from_text(text)
        }
        Err(err) => {
            warn!("Extraction failed for {}: {err}", upload.display_name());
            Extraction::failed(&err)
        }
    }
}
