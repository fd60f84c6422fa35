use std::sync::Arc;

use crate::config::Config;
use crate::latex::{LatexCompiler, SanitizeOptions, TemplateStore};
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable; requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable compiler backend. Default: PdfLatexCompiler.
    pub compiler: Arc<dyn LatexCompiler>,
    pub templates: TemplateStore,
    /// Decided once at startup from `LATEX_ESCAPE_SPECIALS`.
    pub sanitize_options: SanitizeOptions,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient, compiler: Arc<dyn LatexCompiler>) -> Self {
        Self {
            llm,
            compiler,
            templates: TemplateStore::new(config.template_dir.clone()),
            sanitize_options: SanitizeOptions {
                escape_specials: config.escape_specials,
            },
            config,
        }
    }
}
