//! Text-generation provider — trait seam plus the Gemini `generateContent` client.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Public Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Error bodies longer than this are cut before they reach the logs.
const MAX_ERROR_BODY: usize = 512;

/// Anything that can turn a prompt into candidate completions.
pub trait TextProvider: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<GenerateResponse, ProviderError>> + Send;
}

/// Failures talking to the provider. All of them end up as the generic
/// apology; the variants exist for the logs.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
}

// ─── Response shape ────────────────────────────────────────────────────────

/// `generateContent` response. Every level is optional so a structurally
/// incomplete reply still decodes and falls back to the default answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Option<Vec<Part>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Single candidate with a single text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(Content {
                    parts: Some(vec![Part {
                        text: Some(text.into()),
                    }]),
                }),
            }]),
        }
    }

    /// First candidate's first text part, if the reply has one.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_deref()?
            .first()?
            .text
            .as_deref()
    }
}

// ─── Gemini client ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// HTTP client for the Gemini REST API. Cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point the client at a different host (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl TextProvider for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateResponse, ProviderError> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let raw = resp.text().await?;
        debug!("gemini: {} bytes from {model}", raw.len());
        Ok(serde_json::from_str(&raw)?)
    }
}

// ─── Test double ──────────────────────────────────────────────────────────
