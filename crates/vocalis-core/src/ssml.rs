//! Minimal SSML builder for spoken responses.
//!
//! Only the two segment kinds the webhook needs: spoken text and timed
//! breaks. The root `<speak>` element is added by [`SpeechBuilder::build`]
//! and nowhere else.

use std::time::Duration;

/// Longest break a `<break>` tag may carry.
pub const MAX_BREAK: Duration = Duration::from_secs(10);

/// Accumulates speech segments and renders them as one SSML document.
#[derive(Debug, Clone, Default)]
pub struct SpeechBuilder {
    segments: Vec<String>,
}

impl SpeechBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append spoken text. Empty text is skipped.
    pub fn say(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.segments.push(escape(text));
        }
        self
    }

    /// Append a break, clamped to [`MAX_BREAK`].
    pub fn pause(mut self, duration: Duration) -> Self {
        let ms = duration.min(MAX_BREAK).as_millis();
        self.segments.push(format!("<break time=\"{ms}ms\"/>"));
        self
    }

    /// Render the document, wrapped once in `<speak>`.
    pub fn build(&self) -> String {
        format!("<speak>{}</speak>", self.segments.join(" "))
    }
}

/// Escape XML text content. Control characters XML 1.0 forbids are dropped;
/// tab, newline and carriage return are kept.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() && c < '\u{7F}' => {}
            _ => out.push(c),
        }
    }
    out
}
