//! Speech-safety filtering for model replies.
//!
//! Pure functions, no I/O. Speech synthesizers choke on emoji, dingbats and
//! anything outside 7-bit ASCII, so replies are filtered before they are
//! spoken.

use regex::Regex;
use std::sync::LazyLock;

// Symbol and pictograph blocks: general punctuation through misc symbols,
// dingbats, the private use area, and everything in the supplementary planes
// (where the emoji blocks live).
static RE_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{2011}-\x{26FF}\x{2700}-\x{27BF}\x{E000}-\x{F8FF}\x{10000}-\x{10FFFF}]")
        .unwrap()
});
static RE_NON_ASCII: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\x00-\x7F]").unwrap());

/// Strip characters a speech synthesizer cannot say, then trim.
///
/// Interior whitespace is left alone, so `"Great 🎉 job"` becomes
/// `"Great  job"`. May return an empty string.
pub fn sanitize(text: &str) -> String {
    let c = RE_SYMBOLS.replace_all(text, "");
    let c = RE_NON_ASCII.replace_all(&c, "");
    c.trim().to_string()
}
