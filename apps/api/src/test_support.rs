//! Shared fixtures for handler and client tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::Config;
use crate::latex::{CompileError, LatexCompiler, SanitizedLatex};
use crate::llm_client::LlmClient;
use crate::state::AppState;

pub const FAKE_PDF: &[u8] = b"%PDF-1.5 fake";

pub const CLASSIC_TEMPLATE: &str =
    "\\documentclass{article}\n\\begin{document}\nNAME\n\\end{document}\n";

/// What the mock Gemini endpoint received on its last call.
#[derive(Clone, Default)]
pub struct Captured {
    pub body: Arc<Mutex<Option<Value>>>,
    pub key: Arc<Mutex<Option<String>>>,
    pub hits: Arc<Mutex<usize>>,
}

/// Serves every request with the given status and body, recording what was sent.
pub async fn spawn_gemini_mock(status: StatusCode, reply: String) -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .fallback(
            |State((captured, status, reply)): State<(Captured, StatusCode, String)>,
             Query(query): Query<HashMap<String, String>>,
             Json(body): Json<Value>| async move {
                *captured.body.lock().unwrap() = Some(body);
                *captured.key.lock().unwrap() = query.get("key").cloned();
                *captured.hits.lock().unwrap() += 1;
                (status, reply)
            },
        )
        .with_state((captured.clone(), status, reply));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), captured)
}

/// A successful `generateContent` body whose first candidate says `text`.
pub fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
    })
    .to_string()
}

/// In-process compiler that records what it was asked to build.
pub struct RecordingCompiler {
    pub sources: Mutex<Vec<String>>,
    pub assets: Mutex<Vec<PathBuf>>,
    fail_with: Option<String>,
}

impl RecordingCompiler {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(vec![]),
            assets: Mutex::new(vec![]),
            fail_with: None,
        })
    }

    pub fn failing(diagnostic: &str) -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(vec![]),
            assets: Mutex::new(vec![]),
            fail_with: Some(diagnostic.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.sources.lock().unwrap().len()
    }
}

#[async_trait]
impl LatexCompiler for RecordingCompiler {
    async fn compile(
        &self,
        source: &SanitizedLatex,
        assets: &[PathBuf],
    ) -> Result<Vec<u8>, CompileError> {
        self.sources.lock().unwrap().push(source.as_str().to_string());
        *self.assets.lock().unwrap() = assets.to_vec();
        match &self.fail_with {
            Some(diagnostic) => Err(CompileError::Failed {
                exit_code: Some(1),
                diagnostic: diagnostic.clone(),
            }),
            None => Ok(FAKE_PDF.to_vec()),
        }
    }
}

/// Template directory holding `Classic.tex` and one style asset.
pub fn template_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Classic.tex"), CLASSIC_TEMPLATE).unwrap();
    std::fs::write(dir.path().join("resume.sty"), "% style").unwrap();
    dir
}

pub fn test_state(
    api_base: String,
    template_dir: &Path,
    compiler: Arc<dyn LatexCompiler>,
) -> AppState {
    let config = Config {
        gemini_api_base: api_base,
        template_dir: template_dir.to_path_buf(),
        ..Config::for_tests()
    };
    let llm = LlmClient::new(&config).unwrap();
    AppState::new(config, llm, compiler)
}
