//! Text generation clients.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Text generation errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Nothing to send")]
    EmptyPrompt,

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Produces text for a prompt.
pub trait TextGenerator: Send + Sync {
    /// Generate a response; the first candidate's text, trimmed.
    fn generate(&self, prompt: &str) -> LlmResult<String>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        (**self).generate(prompt)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        (**self).generate(prompt)
    }
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: HttpClient,
    base_url: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> LlmResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| LlmError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LlmError::InvalidEndpoint(base_url.to_string()));
        }

        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Endpoint URL without the key parameter.
    pub fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("models")
                .push(&format!("{}:generateContent", self.model));
        }
        url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling generateContent");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json()?;
        first_candidate_text(parsed).ok_or(LlmError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Generator that replays queued responses (for testing without an API).
///
/// An empty queue yields `LlmError::EmptyResponse`.
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response (builder style).
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure (builder style).
    pub fn with_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, response: LlmResult<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str) -> LlmResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}
