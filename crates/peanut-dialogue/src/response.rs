//! Response rendering from the template bank.
//!
//! Picks one variant per category uniformly at random and fills its named
//! slots. Seeding the generator makes the choice sequence reproducible.

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::templates::{ResponseCategory, TemplateSlot, EMPTY_CATEGORY_FALLBACK};

// =============================================================================
// SlotValues
// =============================================================================

/// Values available to fill template slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValues {
    name: Option<String>,
    time: Option<String>,
    location: Option<String>,
    result: Option<String>,
}

impl SlotValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn get(&self, slot: TemplateSlot) -> Option<&str> {
        match slot {
            TemplateSlot::Name => self.name.as_deref(),
            TemplateSlot::Time => self.time.as_deref(),
            TemplateSlot::Location => self.location.as_deref(),
            TemplateSlot::Result => self.result.as_deref(),
        }
    }
}

// =============================================================================
// ResponseGenerator
// =============================================================================

/// Renders responses, choosing among variants of each category.
pub struct ResponseGenerator {
    rng: StdRng,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ResponseGenerator {
    /// Create a generator. `Some(seed)` gives a reproducible sequence of choices.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Pick a variant of `category` and fill it from `values`.
    pub fn render(&mut self, category: ResponseCategory, values: &SlotValues) -> String {
        match category.variants().choose(&mut self.rng) {
            Some(template) => fill(template, values),
            None => {
                tracing::warn!("No templates registered for {}", category);
                EMPTY_CATEGORY_FALLBACK.to_string()
            }
        }
    }
}

/// Substitute `{slot}` placeholders in `template`.
///
/// Placeholders with no value, or with an unknown key, stay in the output
/// verbatim.
pub fn fill(template: &str, values: &SlotValues) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after[..close];
        match TemplateSlot::from_key(key).and_then(|slot| values.get(slot)) {
            Some(value) => out.push_str(value),
            None => {
                tracing::debug!("Template slot {{{}}} left unfilled", key);
                out.push_str(&rest[open..open + close + 2]);
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Clock time as spoken, e.g. "3:07 PM".
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Join a response and a fixed follow-up sentence.
pub fn with_suffix(text: String, suffix: &str) -> String {
    format!("{} {}", text, suffix)
}
