use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Application configuration loaded from environment variables.
/// Built once at startup and handed to every client that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub template_dir: PathBuf,
    pub latex_compiler: String,
    pub compile_timeout: Duration,
    /// Escape `& % $ _` in the document body after sanitizing model output.
    pub escape_specials: bool,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            template_dir: optional_env("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates")),
            latex_compiler: optional_env("LATEX_COMPILER")
                .unwrap_or_else(|| "pdflatex".to_string()),
            compile_timeout: Duration::from_secs(parse_env("COMPILE_TIMEOUT_SECS", 60)?),
            escape_specials: parse_env("LATEX_ESCAPE_SPECIALS", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_api_base: "http://127.0.0.1:9".to_string(),
            gemini_model: "gemini-test".to_string(),
            template_dir: PathBuf::from("templates"),
            latex_compiler: "pdflatex".to_string(),
            compile_timeout: Duration::from_secs(10),
            escape_specials: false,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_port() {
        let port: u16 = parse_value("PORT", "9090").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_parse_value_bool_trims_whitespace() {
        let flag: bool = parse_value("LATEX_ESCAPE_SPECIALS", " true ").unwrap();
        assert!(flag);
    }
}
