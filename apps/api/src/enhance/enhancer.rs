//! Resume enhancement: orchestrates the full flow for one request.
//!
//! Flow: load template → build prompt → Gemini → sanitize → compile.
//!
//! Each stage stops the flow with its own error; nothing after a failed stage runs.

use tracing::{debug, info};
use uuid::Uuid;

use crate::enhance::prompts::{build_enhance_prompt, PromptInputs};
use crate::errors::AppError;
use crate::latex::{sanitize, SanitizedLatex, TemplateName};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct EnhanceInput {
    pub resume_text: String,
    pub job_description: String,
    pub template: TemplateName,
    pub company: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug)]
pub struct EnhancedResume {
    pub latex: SanitizedLatex,
    pub pdf: Vec<u8>,
}

pub async fn enhance_resume(
    state: &AppState,
    input: &EnhanceInput,
    request_id: Uuid,
) -> Result<EnhancedResume, AppError> {
    if input.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please paste the job description.".to_string(),
        ));
    }
    if input.resume_text.trim().is_empty() {
        return Err(AppError::EmptyResume(
            "No text could be extracted from the uploaded resume.".to_string(),
        ));
    }

    let template = state.templates.load(input.template).await?;

    let prompt = build_enhance_prompt(&PromptInputs {
        template: &template,
        resume_text: &input.resume_text,
        job_description: &input.job_description,
        company: input.company.as_deref(),
        position: input.position.as_deref(),
    });
    debug!("[{request_id}] Prompt:\n{prompt}");

    info!(
        "[{request_id}] Enhancing resume with template {} via {}",
        input.template,
        state.llm.model()
    );
    let generated = state.llm.generate(&prompt).await?;

    let (latex, pdf) = render_latex(state, &generated).await?;
    info!("[{request_id}] Resume enhanced: {} byte PDF", pdf.len());

    Ok(EnhancedResume { latex, pdf })
}

/// Sanitizes `raw` and compiles it with the template assets.
///
/// Output without `\begin{document}` is rejected before the compiler is invoked.
pub async fn render_latex(
    state: &AppState,
    raw: &str,
) -> Result<(SanitizedLatex, Vec<u8>), AppError> {
    let latex = sanitize(raw, state.sanitize_options).map_err(|_| AppError::UnusableOutput {
        raw_output: raw.to_string(),
    })?;
    debug!("Sanitized LaTeX:\n{latex}");

    let assets = state.templates.assets().await?;
    let pdf = state
        .compiler
        .compile(&latex, &assets)
        .await
        .map_err(|error| AppError::Compilation {
            error,
            latex: latex.as_str().to_string(),
        })?;

    Ok((latex, pdf))
}
