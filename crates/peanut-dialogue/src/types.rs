//! Shared types for the dialogue engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Intent
// =============================================================================

/// Conversational goal of one turn.
///
/// `GetWeatherClarification` and `ExternalQuery` are never produced by
/// classification; they record what the engine is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Greeting,
    HowAreYou,
    NameInquiry,
    SetName,
    TellJoke,
    Goodbye,
    ThankYou,
    WhatTime,
    GetWeather,
    GetWeatherClarification,
    ExternalQuery,
    SmallTalk,
    Affirmation,
    Negation,
    Unknown,
}

impl Intent {
    /// Stable upper-case label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "GREETING",
            Intent::HowAreYou => "HOW_ARE_YOU",
            Intent::NameInquiry => "NAME_INQUIRY",
            Intent::SetName => "SET_NAME",
            Intent::TellJoke => "TELL_JOKE",
            Intent::Goodbye => "GOODBYE",
            Intent::ThankYou => "THANK_YOU",
            Intent::WhatTime => "WHAT_TIME",
            Intent::GetWeather => "GET_WEATHER",
            Intent::GetWeatherClarification => "GET_WEATHER_CLARIFICATION",
            Intent::ExternalQuery => "EXTERNAL_QUERY",
            Intent::SmallTalk => "SMALL_TALK",
            Intent::Affirmation => "AFFIRMATION",
            Intent::Negation => "NEGATION",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Whether this value describes engine bookkeeping rather than something
    /// the user said.
    pub fn is_meta(&self) -> bool {
        matches!(self, Intent::GetWeatherClarification | Intent::ExternalQuery)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Named slot that entity extraction can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Location,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Location => write!(f, "location"),
        }
    }
}

/// Slot values extracted from the current turn's input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    slots: HashMap<Slot, String>,
}

impl Entities {
    /// Create an empty entity map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a trimmed value for `slot`.
    ///
    /// Returns `false` and leaves the map untouched when the value is empty
    /// or whitespace only.
    pub fn insert(&mut self, slot: Slot, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        self.slots.insert(slot, value.to_string());
        true
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Shorthand for the location slot.
    pub fn location(&self) -> Option<&str> {
        self.get(Slot::Location)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

// =============================================================================
// Replies
// =============================================================================

/// How the host should treat a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Complete answer; keep listening.
    Final,
    /// The engine asked for a missing slot; keep listening for it.
    Clarification,
    /// Placeholder while a resolver works; wait for the async reply before
    /// listening again.
    Interim,
    /// The user said goodbye; end the session.
    Farewell,
}

impl ReplyKind {
    /// Whether a final text will follow out-of-band.
    pub fn expects_async_reply(&self) -> bool {
        matches!(self, ReplyKind::Interim)
    }

    /// Whether the host should go back to listening right after speaking.
    pub fn keeps_listening(&self) -> bool {
        matches!(self, ReplyKind::Final | ReplyKind::Clarification)
    }
}

/// Immediate result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Text to speak right away.
    pub text: String,
    pub kind: ReplyKind,
    /// Intent the turn resolved to, after clarification coercion.
    pub intent: Intent,
}

/// Which resolver an outstanding dispatch is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    Weather,
    ExternalQuery,
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionKind::Weather => write!(f, "weather lookup"),
            ResolutionKind::ExternalQuery => write!(f, "external query"),
        }
    }
}

/// Final text produced when an asynchronous resolution completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncReply {
    pub text: String,
    pub kind: ResolutionKind,
    /// `false` when the resolver failed and `text` is an apology.
    pub resolved: bool,
}

/// Lowercase and trim raw speech-to-text output before it reaches the engine.
pub fn normalize_utterance(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::Greeting.to_string(), "GREETING");
        assert_eq!(
            Intent::GetWeatherClarification.to_string(),
            "GET_WEATHER_CLARIFICATION"
        );
        assert_eq!(Intent::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_intent_meta_states() {
        assert!(Intent::GetWeatherClarification.is_meta());
        assert!(Intent::ExternalQuery.is_meta());
        assert!(!Intent::GetWeather.is_meta());
        assert!(!Intent::Unknown.is_meta());
    }

    #[test]
    fn test_intent_serde_matches_display() {
        for intent in [Intent::HowAreYou, Intent::GetWeatherClarification, Intent::SmallTalk] {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent));
        }
    }

    #[test]
    fn test_entities_insert_trims_and_rejects_blank() {
        let mut entities = Entities::new();
        assert!(!entities.insert(Slot::Location, "   "));
        assert!(entities.is_empty());

        assert!(entities.insert(Slot::Location, "  new york "));
        assert_eq!(entities.location(), Some("new york"));
        assert!(entities.contains(Slot::Location));
        assert_eq!(entities.len(), 1);

        entities.clear();
        assert!(entities.location().is_none());
    }

    #[test]
    fn test_reply_kind_listening() {
        assert!(ReplyKind::Final.keeps_listening());
        assert!(ReplyKind::Clarification.keeps_listening());
        assert!(!ReplyKind::Interim.keeps_listening());
        assert!(!ReplyKind::Farewell.keeps_listening());
        assert!(ReplyKind::Interim.expects_async_reply());
        assert!(!ReplyKind::Final.expects_async_reply());
    }

    #[test]
    fn test_normalize_utterance() {
        assert_eq!(normalize_utterance("  What's The WEATHER  "), "what's the weather");
        assert_eq!(normalize_utterance(""), "");
    }
}
