//! Rule-based intent classification.
//!
//! Rules are evaluated in a fixed order and the first match wins. A matching
//! rule may carry an extractor that fills slots from the same text.

use regex::Regex;
use std::sync::LazyLock;

use crate::entity;
use crate::types::{Entities, Intent, Slot};

/// Slot extraction attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extractor {
    /// Capture the user's name from an introduction.
    Name,
    /// Capture a city from "weather in <place>".
    Location,
}

/// One entry in the ordered rule table.
struct IntentRule {
    intent: Intent,
    regex: Regex,
    extractor: Option<Extractor>,
}

/// Outcome of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub entities: Entities,
    /// Name introduced in this utterance, if any.
    pub user_name: Option<String>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            entities: Entities::new(),
            user_name: None,
        }
    }
}

// =============================================================================
// Rule table (order matters)
// =============================================================================

const RULE_TABLE: &[(Intent, &str, Option<Extractor>)] = &[
    (
        Intent::Greeting,
        r"(?i)\b(?:hello|hi|hey|greetings|good\s+morning|good\s+afternoon|good\s+evening)\b",
        None,
    ),
    (
        Intent::HowAreYou,
        r"(?i)\b(?:how\s+are\s+you|how\s+you\s+doing|how's\s+it\s+going)\b",
        None,
    ),
    (
        Intent::NameInquiry,
        r"(?i)\b(?:what\s+is\s+your\s+name|who\s+are\s+you|your\s+name|what\s+do\s+you\s+call\s+yourself)\b",
        None,
    ),
    (
        Intent::SetName,
        r"(?i)\b(?:my\s+name\s+is|i\s+am\s+called|you\s+can\s+call\s+me|i'm)\s+\p{L}+",
        Some(Extractor::Name),
    ),
    (
        Intent::TellJoke,
        r"(?i)\b(?:tell\s+me\s+a\s+joke|joke\s+please|make\s+me\s+laugh|tell\s+a\s+funny\s+story)\b",
        None,
    ),
    (
        Intent::Goodbye,
        r"(?i)\b(?:goodbye|bye|see\s+you\s+later|farewell|i'm\s+leaving|i'm\s+done|exit)\b",
        None,
    ),
    (
        Intent::ThankYou,
        r"(?i)\b(?:thank\s+you|thanks|i\s+appreciate\s+it|cheers)\b",
        None,
    ),
    (
        Intent::WhatTime,
        r"(?i)\b(?:what\s+time\s+is\s+it|current\s+time|time\s+now|do\s+you\s+know\s+the\s+time)\b",
        None,
    ),
    (
        Intent::GetWeather,
        r"(?i)\b(?:weather|forecast|how's\s+the\s+weather|temperature)\b",
        Some(Extractor::Location),
    ),
    (
        Intent::Affirmation,
        r"(?i)\b(?:yes|yeah|yep|okay|sure|alright|fine)\b",
        None,
    ),
    (
        Intent::Negation,
        r"(?i)\b(?:no|nope|not\s+really|nah)\b",
        None,
    ),
    (
        Intent::SmallTalk,
        r"(?i)\b(?:okay|alright|right|hmm|what\s+about|tell\s+me\s+more|interesting)\b",
        None,
    ),
];

static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|(intent, pattern, extractor)| IntentRule {
            intent: *intent,
            regex: Regex::new(pattern).expect("Invalid intent regex"),
            extractor: *extractor,
        })
        .collect()
});

// =============================================================================
// IntentClassifier
// =============================================================================

/// Maps normalized utterances to intents using the ordered rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify `text`, running the winning rule's extractor.
    ///
    /// Returns `Unknown` with no entities when nothing matches.
    pub fn classify(&self, text: &str) -> Classification {
        let Some(rule) = RULES.iter().find(|rule| rule.regex.is_match(text)) else {
            tracing::debug!("No intent rule matched");
            return Classification::unknown();
        };

        let mut entities = Entities::new();
        let mut user_name = None;
        match rule.extractor {
            Some(Extractor::Name) => user_name = entity::extract_name(text),
            Some(Extractor::Location) => {
                if let Some(location) = entity::extract_location(text) {
                    entities.insert(Slot::Location, &location);
                }
            }
            None => {}
        }

        tracing::debug!("Classified intent: {}", rule.intent);
        Classification {
            intent: rule.intent,
            entities,
            user_name,
        }
    }

    /// Treat the whole utterance as a city name.
    ///
    /// Only used while the engine is waiting for a weather location: the text
    /// must look like a place and must not match any other intent.
    pub fn extract_fallback_location(&self, text: &str) -> Option<String> {
        let candidate = entity::bare_location_candidate(text)?;
        if RULES.iter().any(|rule| rule.regex.is_match(text)) {
            return None;
        }
        Some(candidate)
    }
}
