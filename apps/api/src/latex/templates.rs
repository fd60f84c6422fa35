//! Template store: the fixed set of LaTeX templates and their static assets.
//!
//! Layout of the template directory:
//!   Classic.tex, Modern.tex       one source file per `TemplateName`
//!   *.sty *.cls *.bst *.bib ...   assets copied next to every compiled document

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File extensions copied into the compiler's working directory.
pub const ASSET_EXTENSIONS: &[&str] = &["sty", "cls", "bst", "bib", "ttf", "otf", "png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template '{0}'. Expected one of: Classic, Modern")]
    Unknown(String),

    #[error("Template '{name}' not found at {}", path.display())]
    Missing { name: TemplateName, path: PathBuf },

    #[error("Template directory I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateName {
    #[default]
    Classic,
    Modern,
}

impl TemplateName {
    pub const ALL: [TemplateName; 2] = [TemplateName::Classic, TemplateName::Modern];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::Classic => "Classic",
            TemplateName::Modern => "Modern",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.tex", self.as_str())
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TemplateName::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TemplateError::Unknown(wanted.to_string()))
    }
}

/// Read-only view over the template directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load(&self, name: TemplateName) -> Result<String, TemplateError> {
        let path = self.dir.join(name.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TemplateError::Missing { name, path })
            }
            Err(e) => Err(TemplateError::Io(e)),
        }
    }

    /// Asset files to copy next to a compiled document, sorted by path.
    /// A missing template directory yields no assets.
    pub async fn assets(&self) -> Result<Vec<PathBuf>, TemplateError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_asset(&path) {
                assets.push(path);
            }
        }
        assets.sort();
        debug!("Found {} template assets in {}", assets.len(), self.dir.display());
        Ok(assets)
    }
}

fn is_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ASSET_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_name_parses_case_insensitively() {
        assert_eq!("classic".parse::<TemplateName>().unwrap(), TemplateName::Classic);
        assert_eq!(" MODERN ".parse::<TemplateName>().unwrap(), TemplateName::Modern);
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let err = "Fancy".parse::<TemplateName>().unwrap_err();
        assert!(matches!(err, TemplateError::Unknown(ref n) if n == "Fancy"));
    }

    #[test]
    fn test_template_file_name() {
        assert_eq!(TemplateName::Modern.file_name(), "Modern.tex");
    }

    #[test]
    fn test_is_asset() {
        assert!(is_asset(Path::new("templates/resume.cls")));
        assert!(is_asset(Path::new("templates/logo.PNG")));
        assert!(!is_asset(Path::new("templates/Classic.tex")));
        assert!(!is_asset(Path::new("templates/README")));
    }

    #[tokio::test]
    async fn test_load_reads_template_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Classic.tex"), "\\begin{document}\\end{document}").unwrap();
        let store = TemplateStore::new(dir.path());

        let source = store.load(TemplateName::Classic).await.unwrap();
        assert!(source.contains("\\begin{document}"));
    }

    #[tokio::test]
    async fn test_load_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let err = store.load(TemplateName::Modern).await.unwrap_err();
        assert!(matches!(err, TemplateError::Missing { name: TemplateName::Modern, .. }));
    }

    #[tokio::test]
    async fn test_assets_are_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Classic.tex", "z.sty", "a.cls", "notes.txt", "photo.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("fonts.otf")).unwrap();
        let store = TemplateStore::new(dir.path());

        let names: Vec<String> = store
            .assets()
            .await
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.cls", "photo.jpg", "z.sty"]);
    }

    #[tokio::test]
    async fn test_missing_directory_has_no_assets() {
        let store = TemplateStore::new("/definitely/not/a/template/dir");
        assert!(store.assets().await.unwrap().is_empty());
    }
}
