//! Slot extraction from utterance text.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest bare utterance accepted as a city name during clarification.
const MIN_FALLBACK_LOCATION_CHARS: usize = 3;

// "weather in <place>" and friends. Case-insensitive keyword, capture keeps
// the caller's casing.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bweather\s+(?:in|for|of|at)\s+([\p{L}\s]+)")
        .expect("Invalid location regex")
});

// Ordered name introductions; the first pattern that matches wins.
static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bmy\s+name\s+is\s+([\p{L}]+)",
        r"(?i)\bi\s+am\s+called\s+([\p{L}]+)",
        r"(?i)\byou\s+can\s+call\s+me\s+([\p{L}]+)",
        r"(?i)\bi'm\s+([\p{L}]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid name regex"))
    .collect()
});

static BARE_LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").expect("Invalid bare location regex"));

/// Location named after a weather keyword, trimmed.
///
/// Returns `None` when no phrase matches or the capture is blank.
pub fn extract_location(text: &str) -> Option<String> {
    LOCATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|loc| !loc.is_empty())
}

/// User name from an introduction phrase.
pub fn extract_name(text: &str) -> Option<String> {
    NAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Whole utterance as a city name, if it looks like one.
///
/// Only letters and spaces, and at least three characters once trimmed.
/// Whether the text also carries no other intent is the classifier's call.
pub fn bare_location_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_FALLBACK_LOCATION_CHARS {
        return None;
    }
    BARE_LOCATION_RE
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}
