//! LaTeX → PDF compilation behind a pluggable capability trait.
//!
//! `AppState` holds an `Arc<dyn LatexCompiler>`; `PdfLatexCompiler` is the default
//! backend. Every compilation runs in its own temporary directory, removed when the
//! `TempDir` guard drops (success, failure, early return or cancelled request).

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::latex::diagnostics;
use crate::latex::sanitize::SanitizedLatex;

pub const SOURCE_FILE_NAME: &str = "resume.tex";
pub const OUTPUT_FILE_NAME: &str = "resume.pdf";

/// Cross-references (section numbers, citations) only resolve on the second run.
pub const COMPILE_PASSES: u32 = 2;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to prepare compilation directory: {0}")]
    Workspace(#[from] io::Error),

    #[error("Failed to launch LaTeX compiler '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("LaTeX compiler timed out after {}s on pass {pass}", after.as_secs_f32())]
    TimedOut { pass: u32, after: Duration },

    #[error("LaTeX compiler exited with status {}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    Failed {
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("LaTeX compiler exited successfully but produced no resume.pdf")]
    MissingOutput { diagnostic: String },
}

impl CompileError {
    /// Compiler output worth showing to the user, if the compiler ran at all.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            CompileError::Failed { diagnostic, .. } | CompileError::MissingOutput { diagnostic } => {
                Some(diagnostic)
            }
            _ => None,
        }
    }
}

/// compile(source, assets) → PDF bytes | diagnostic.
///
/// Implement this to swap compiler backends without touching the sanitize step
/// or the handlers.
#[async_trait]
pub trait LatexCompiler: Send + Sync {
    async fn compile(
        &self,
        source: &SanitizedLatex,
        assets: &[PathBuf],
    ) -> Result<Vec<u8>, CompileError>;
}

/// Runs an external `pdflatex`-compatible binary in batch mode.
#[derive(Debug, Clone)]
pub struct PdfLatexCompiler {
    program: String,
    timeout: Duration,
}

impl PdfLatexCompiler {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.latex_compiler.clone(), config.compile_timeout)
    }

    async fn run_pass(&self, workdir: &Path, pass: u32) -> Result<Output, CompileError> {
        let mut command = Command::new(&self.program);
        command
            .args([
                "-interaction=nonstopmode",
                "-halt-on-error",
                "-no-shell-escape",
                SOURCE_FILE_NAME,
            ])
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("Running {} pass {pass}/{COMPILE_PASSES}", self.program);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(CompileError::Spawn {
                program: self.program.clone(),
                source,
            }),
            Err(_) => Err(CompileError::TimedOut {
                pass,
                after: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl LatexCompiler for PdfLatexCompiler {
    async fn compile(
        &self,
        source: &SanitizedLatex,
        assets: &[PathBuf],
    ) -> Result<Vec<u8>, CompileError> {
        let workdir = tempfile::Builder::new().prefix("enhancer-").tempdir()?;
        let dir = workdir.path();

        tokio::fs::write(dir.join(SOURCE_FILE_NAME), source.as_str()).await?;
        stage_assets(dir, assets).await?;

        let mut output = self.run_pass(dir, 1).await?;
        for pass in 2..=COMPILE_PASSES {
            if !output.status.success() {
                break;
            }
            output = self.run_pass(dir, pass).await?;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} output:\n{stdout}", self.program);
        let log = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr)
        } else {
            stdout
        };

        let pdf_path = dir.join(OUTPUT_FILE_NAME);
        if !output.status.success() {
            warn!("{} exited with {}", self.program, output.status);
            return Err(CompileError::Failed {
                exit_code: output.status.code(),
                diagnostic: diagnostics::summarize(&log),
            });
        }
        if !tokio::fs::try_exists(&pdf_path).await? {
            warn!("{} exited cleanly without writing {OUTPUT_FILE_NAME}", self.program);
            return Err(CompileError::MissingOutput {
                diagnostic: diagnostics::summarize(&log),
            });
        }

        let pdf = tokio::fs::read(&pdf_path).await?;
        info!("Compiled PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}

async fn stage_assets(dir: &Path, assets: &[PathBuf]) -> Result<(), CompileError> {
    for asset in assets {
        let Some(name) = asset.file_name() else {
            continue;
        };
        tokio::fs::copy(asset, dir.join(name)).await?;
    }
    Ok(())
}
