//! Shared types for the vocalis skill webhook.
//!
//! Wire shapes for the voice-assistant request/response envelope plus the
//! in-process [`VoiceResponse`] the assembler produces. Kept here so the CLI
//! and tests can use them without pulling in tokio or axum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Envelope version the voice platform expects.
pub const RESPONSE_VERSION: &str = "1.0";

/// JSON pointer to the spoken query inside an inbound skill request.
pub const QUERY_POINTER: &str = "/request/intent/slots/query/value";

// ─── Output format ─────────────────────────────────────────────────────────

/// Which speech shape successful answers are returned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    #[serde(rename = "ssml")]
    Markup,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "plaintext" => Ok(Self::Plain),
            "ssml" | "markup" => Ok(Self::Markup),
            other => Err(format!(
                "unknown output format '{other}'; valid formats: plain, ssml"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Markup => f.write_str("ssml"),
        }
    }
}

// ─── Assembler output ─────────────────────────────────────────────────────

/// What gets spoken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speech {
    PlainText(String),
    /// A complete SSML document with a single `<speak>` root.
    Markup(String),
}

/// Result of handling one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResponse {
    pub speech: Speech,
    pub end_session: bool,
}

impl VoiceResponse {
    pub fn plain(text: impl Into<String>, end_session: bool) -> Self {
        Self {
            speech: Speech::PlainText(text.into()),
            end_session,
        }
    }

    pub fn markup(document: impl Into<String>, end_session: bool) -> Self {
        Self {
            speech: Speech::Markup(document.into()),
            end_session,
        }
    }
}

// ─── Wire envelope ─────────────────────────────────────────────────────────

/// `outputSpeech` object, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    pub should_end_session: bool,
}

/// Top-level JSON returned to the voice platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

impl From<VoiceResponse> for SkillResponse {
    fn from(v: VoiceResponse) -> Self {
        let output_speech = match v.speech {
            Speech::PlainText(text) => OutputSpeech::PlainText { text },
            Speech::Markup(ssml) => OutputSpeech::Ssml { ssml },
        };
        Self {
            version: RESPONSE_VERSION.to_string(),
            response: ResponseBody {
                output_speech,
                should_end_session: v.end_session,
            },
        }
    }
}

/// Pull the spoken query out of a raw skill request body.
///
/// Any missing level, non-string value, or empty string counts as no query.
pub fn extract_query(body: &serde_json::Value) -> Option<&str> {
    body.pointer(QUERY_POINTER)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Build the skill request body the platform would send for `query`.
pub fn skill_request(query: &str) -> serde_json::Value {
    serde_json::json!({
        "request": {
            "type": "IntentRequest",
            "intent": { "slots": { "query": { "name": "query", "value": query } } }
        }
    })
}
