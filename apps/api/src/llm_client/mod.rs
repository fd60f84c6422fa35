//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! No other module may call the generation endpoint directly.
//! One attempt per user action: failures are returned to the caller, never retried.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// Sampling parameters are fixed: low randomness, bounded output.
const TEMPERATURE: f64 = 0.2;
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Error during API call: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error calling Gemini API: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response format from Gemini API: {0}")]
    Format(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Sends `prompt` and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(
            "Calling {} with a {} char prompt",
            self.endpoint(),
            prompt.len()
        );

        // The key goes in the query string and must never be logged.
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;

        if !status.is_success() {
            warn!("Gemini API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            debug!("Unparseable Gemini response body: {body}");
            LlmError::Format(e.to_string())
        })?;

        let text = parsed.first_text().ok_or_else(|| {
            let reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            debug!("Gemini response without text: {body}");
            LlmError::Format(format!("missing candidates[0].content.parts[0].text ({reason})"))
        })?;

        debug!("Gemini call succeeded: {} chars generated", text.len());

        Ok(text.to_string())
    }
}
