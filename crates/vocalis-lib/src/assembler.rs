//! Response assembler — query → provider → sanitizer → voice response.
//!
//! ```text
//! handle(None)          → "didn't catch that", session stays open
//! handle(Some(q)) ok    → sanitized reply as PlainText or SSML, session ends
//! handle(Some(q)) error → generic apology, session ends
//! ```
//!
//! Exactly one provider call per query, bounded by a timeout. Nothing is
//! retried and no error escapes `handle`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use vocalis_core::sanitize::sanitize;
use vocalis_core::ssml::SpeechBuilder;
use vocalis_core::types::{OutputFormat, VoiceResponse};

use crate::config::{DEFAULT_PROVIDER_TIMEOUT, SkillConfig};
use crate::provider::{DEFAULT_MODEL, ProviderError, TextProvider};
use crate::random::{NumberSource, ThreadRandom};

pub const NO_QUERY_TEXT: &str = "I didn't catch that. Can you say it again?";
pub const NO_ANSWER_TEXT: &str = "Sorry, I couldn't find an answer.";
pub const FAILURE_TEXT: &str = "Something went wrong while processing your request.";

pub const LEAD_IN: &str = "Here's what I found:";
pub const SIGN_OFF: &str = "See you again!";
pub const LUCKY_NUMBER_BOUND: u32 = 100;

const PREAMBLE: &str = "You are a helpful Alexa-like voice assistant.\n\
Answer briefly, clearly, and add a light funny tone or a friendly touch.\n\
Keep the answer short, maximum 2-4 lines.";

/// Full prompt sent to the provider for `query`.
pub fn build_prompt(query: &str) -> String {
    format!("{PREAMBLE}\nQuestion: {query}\nAnswer:")
}

/// Turns a spoken query into a [`VoiceResponse`]. Shared across requests
/// behind an `Arc`; holds no per-request state.
pub struct Assembler<P> {
    provider: P,
    numbers: Arc<dyn NumberSource>,
    format: OutputFormat,
    model: String,
    timeout: Duration,
}

impl<P: TextProvider> Assembler<P> {
    pub fn new(provider: P, format: OutputFormat) -> Self {
        Self {
            provider,
            numbers: Arc::new(ThreadRandom),
            format,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Build from the format, model and timeout in `config`.
    pub fn from_config(provider: P, config: &SkillConfig) -> Self {
        Self::new(provider, config.format)
            .with_model(&config.model)
            .with_timeout(config.provider_timeout)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the lucky-number source (seeded in tests).
    pub fn with_numbers(mut self, numbers: Arc<dyn NumberSource>) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer one query. Never fails: every error becomes a spoken apology.
    pub async fn handle(&self, query: Option<&str>) -> VoiceResponse {
        let Some(query) = query else {
            debug!("no query in request");
            return VoiceResponse::plain(NO_QUERY_TEXT, false);
        };

        match self.answer(query).await {
            Ok(reply) => self.shape(&reply),
            Err(e) => {
                error!("provider call failed: {e}");
                VoiceResponse::plain(FAILURE_TEXT, true)
            }
        }
    }

    /// Ask the provider and return the speech-safe reply text.
    async fn answer(&self, query: &str) -> Result<String, ProviderError> {
        let prompt = build_prompt(query);
        debug!(
            "assembler: prompting {} ({} chars, format {})",
            self.model,
            prompt.len(),
            self.format
        );

        let resp = tokio::time::timeout(self.timeout, self.provider.generate(&self.model, &prompt))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        let raw = match resp.first_text() {
            Some(text) if !text.is_empty() => text,
            _ => {
                warn!("provider reply had no text; using fallback");
                NO_ANSWER_TEXT
            }
        };

        let reply = sanitize(raw);
        if reply.is_empty() {
            warn!("reply was empty after sanitizing ({} chars raw)", raw.len());
            return Ok(NO_ANSWER_TEXT.to_string());
        }
        Ok(reply)
    }

    fn shape(&self, reply: &str) -> VoiceResponse {
        match self.format {
            OutputFormat::Plain => VoiceResponse::plain(reply, true),
            OutputFormat::Markup => VoiceResponse::markup(self.markup(reply), true),
        }
    }

    fn markup(&self, reply: &str) -> String {
        let lucky = self.numbers.below(LUCKY_NUMBER_BOUND);
        SpeechBuilder::new()
            .say(LEAD_IN)
            .pause(Duration::from_millis(500))
            .say(reply)
            .pause(Duration::from_millis(700))
            .say(&format!("By the way, your lucky number is {lucky}!"))
            .pause(Duration::from_millis(500))
            .say(SIGN_OFF)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use vocalis_core::types::Speech;

    use super::*;
    use crate::provider::GenerateResponse;
    use crate::provider::mock::{Behaviour, MockProvider};
    use crate::random::SeededRandom;

    fn plain(provider: MockProvider) -> Assembler<MockProvider> {
        Assembler::new(provider, OutputFormat::Plain)
    }

    fn markup(provider: MockProvider, seed: u64) -> Assembler<MockProvider> {
        Assembler::new(provider, OutputFormat::Markup).with_numbers(Arc::new(SeededRandom::new(seed)))
    }

    fn document(resp: &VoiceResponse) -> &str {
        match &resp.speech {
            Speech::Markup(doc) => doc,
            other => panic!("expected markup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_query_skips_provider() {
        for format in [OutputFormat::Plain, OutputFormat::Markup] {
            let a = Assembler::new(MockProvider::replying("unused"), format);
            let resp = a.handle(None).await;
            assert_eq!(resp, VoiceResponse::plain(NO_QUERY_TEXT, false));
            assert_eq!(a.provider.calls(), 0);
        }
    }

    #[tokio::test]
    async fn plain_success() {
        let a = plain(MockProvider::replying("Paris"));
        let resp = a.handle(Some("capital of France")).await;
        assert_eq!(resp, VoiceResponse::plain("Paris", true));
        assert_eq!(a.provider.calls(), 1);
    }

    #[tokio::test]
    async fn prompt_carries_preamble_and_query() {
        let a = plain(MockProvider::replying("Paris"));
        a.handle(Some("capital of France")).await;
        let prompt = a.provider.last_prompt().unwrap();
        assert!(prompt.starts_with("You are a helpful Alexa-like voice assistant."));
        assert!(prompt.contains("maximum 2-4 lines"));
        assert!(prompt.ends_with("\nQuestion: capital of France\nAnswer:"));
    }

    #[tokio::test]
    async fn provider_failure_is_generic_apology() {
        for format in [OutputFormat::Plain, OutputFormat::Markup] {
            let a = Assembler::new(MockProvider::new(Behaviour::Fail), format);
            let resp = a.handle(Some("anything")).await;
            assert_eq!(resp, VoiceResponse::plain(FAILURE_TEXT, true));
            assert_eq!(a.provider.calls(), 1);
        }
    }

    #[tokio::test]
    async fn provider_timeout_is_generic_apology() {
        let a = plain(MockProvider::new(Behaviour::Hang)).with_timeout(Duration::from_millis(50));
        let resp = a.handle(Some("anything")).await;
        assert_eq!(resp, VoiceResponse::plain(FAILURE_TEXT, true));
    }

    #[tokio::test]
    async fn structurally_empty_reply_uses_fallback() {
        let a = plain(MockProvider::new(Behaviour::Reply(GenerateResponse::default())));
        let resp = a.handle(Some("anything")).await;
        assert_eq!(resp, VoiceResponse::plain(NO_ANSWER_TEXT, true));
    }

    #[tokio::test]
    async fn empty_text_uses_fallback() {
        let a = plain(MockProvider::replying(""));
        let resp = a.handle(Some("anything")).await;
        assert_eq!(resp, VoiceResponse::plain(NO_ANSWER_TEXT, true));
    }

    #[tokio::test]
    async fn all_emoji_reply_uses_fallback() {
        let a = plain(MockProvider::replying("🎉🎉🎉"));
        let resp = a.handle(Some("party?")).await;
        assert_eq!(resp, VoiceResponse::plain(NO_ANSWER_TEXT, true));
    }

    #[tokio::test]
    async fn reply_is_sanitized() {
        let a = plain(MockProvider::replying("  Great 🎉 job  "));
        let resp = a.handle(Some("how did I do")).await;
        assert_eq!(resp, VoiceResponse::plain("Great  job", true));
    }

    #[tokio::test]
    async fn markup_segments_in_order() {
        let a = markup(MockProvider::replying("Paris"), 7);
        let resp = a.handle(Some("capital of France")).await;
        assert!(resp.end_session);

        let doc = document(&resp);
        assert!(doc.starts_with("<speak>"));
        assert!(doc.ends_with("</speak>"));
        assert_eq!(doc.matches("<speak>").count(), 1);

        let lead = doc.find(LEAD_IN).unwrap();
        let reply = doc.find("Paris").unwrap();
        let lucky = doc.find("your lucky number is ").unwrap();
        let sign_off = doc.find(SIGN_OFF).unwrap();
        assert!(lead < reply && reply < lucky && lucky < sign_off);

        let tail = &doc[lucky + "your lucky number is ".len()..];
        let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
        let n: u32 = digits.parse().unwrap();
        assert!(n < LUCKY_NUMBER_BOUND);
    }

    #[tokio::test]
    async fn markup_is_deterministic_with_seed() {
        let expected = SeededRandom::new(99).below(LUCKY_NUMBER_BOUND);
        let a = markup(MockProvider::replying("Paris"), 99);
        let resp = a.handle(Some("capital of France")).await;
        assert_eq!(
            document(&resp),
            format!(
                "<speak>Here's what I found: <break time=\"500ms\"/> Paris \
                 <break time=\"700ms\"/> By the way, your lucky number is {expected}! \
                 <break time=\"500ms\"/> See you again!</speak>"
            )
        );
    }

    #[tokio::test]
    async fn markup_escapes_reply() {
        let a = markup(MockProvider::replying("Salt & pepper <both>"), 1);
        let resp = a.handle(Some("seasoning")).await;
        let doc = document(&resp);
        assert!(doc.contains("Salt &amp; pepper &lt;both&gt;"));
        assert_eq!(doc.matches("<speak>").count(), 1);
    }

    #[tokio::test]
    async fn markup_drops_control_characters() {
        let a = markup(MockProvider::replying("Paris\u{1}\u{b} rocks"), 3);
        let resp = a.handle(Some("capital of France")).await;
        let doc = document(&resp);
        assert!(doc.contains("Paris rocks"));
        assert!(!doc.chars().any(|c| c.is_ascii_control()));
    }

    #[tokio::test]
    async fn from_config_applies_settings() {
        let config = SkillConfig {
            api_key: "k".into(),
            format: OutputFormat::Plain,
            model: "gemini-1.5-pro".into(),
            ..Default::default()
        };
        let a = Assembler::from_config(MockProvider::replying("ok"), &config);
        assert_eq!(a.format(), OutputFormat::Plain);
        assert_eq!(a.model, "gemini-1.5-pro");
        assert_eq!(a.timeout, config.provider_timeout);
    }
}
