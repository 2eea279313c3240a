// src/normalize.rs
//! Text normalizer for raw post text. Pure and total: empty in, empty out.
//!
//! Step order matters: HTML entities are decoded before URL/mention stripping
//! so that escaped links are caught, and punctuation removal runs after the
//! `#` strip so hashtag words survive.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").unwrap());
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\S+").unwrap());
static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup, URLs, mentions and punctuation; collapse whitespace; lowercase.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = html_escape::decode_html_entities(text).to_string();
    out = RE_URL.replace_all(&out, "").into_owned();
    out = RE_MENTION.replace_all(&out, "").into_owned();
    // Keep hashtag words, drop the marker.
    out = out.replace('#', "");
    out = RE_PUNCT.replace_all(&out, " ").into_owned();
    out = RE_WS.replace_all(&out, " ").trim().to_string();
    out.to_lowercase()
}
