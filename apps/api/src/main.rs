mod config;
mod enhance;
mod errors;
mod extract;
mod latex;
mod llm_client;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::latex::{PdfLatexCompiler, TemplateName};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Enhancer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize compiler backend (pdflatex by default)
    let compiler = Arc::new(PdfLatexCompiler::from_config(&config));
    info!(
        "LaTeX compiler: {} (timeout {}s per pass)",
        config.latex_compiler,
        config.compile_timeout.as_secs()
    );

    // Build app state
    let state = AppState::new(config.clone(), llm, compiler);
    check_templates(&state).await;

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Logs which templates are usable. Missing ones only fail the requests that pick them.
async fn check_templates(state: &AppState) {
    for name in TemplateName::ALL {
        match state.templates.load(name).await {
            Ok(_) => info!("Template {name} available"),
            Err(e) => warn!("{e}"),
        }
    }
    match state.templates.assets().await {
        Ok(assets) => info!(
            "{} template assets in {}",
            assets.len(),
            state.templates.dir().display()
        ),
        Err(e) => warn!("Cannot list template assets: {e}"),
    }
}
