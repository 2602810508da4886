//! Response template bank.
//!
//! Templates use named slots written as `{name}`, `{time}`, `{location}` and
//! `{result}`. Each category lists the slots its variants may reference.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Spoken when a category has no variants.
pub const EMPTY_CATEGORY_FALLBACK: &str = "I don't have a response for that right now.";

/// Appended to the first greeting while the user is still unnamed.
pub const NAME_REQUEST_SUFFIX: &str = "By the way, what name should I use to call you?";

/// Appended to every joke.
pub const JOKE_FOLLOW_UP: &str = "Did that make you smile? What else can I do for you?";

/// Appended to an affirmation that answers a joke.
pub const AFFIRMATION_AFTER_JOKE: &str = "Glad to hear it! Anything else?";

/// Appended to any other affirmation.
pub const AFFIRMATION_FOLLOW_UP: &str = "How can I proceed?";

/// Appended to every negation.
pub const NEGATION_FOLLOW_UP: &str = "What would you like to do instead?";

/// Appended to a failure response while a weather city is still missing.
pub const CLARIFICATION_REMINDER: &str = "I'm still waiting for the city name for the weather.";

// =============================================================================
// Slots and categories
// =============================================================================

/// Named placeholder inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateSlot {
    Name,
    Time,
    Location,
    Result,
}

impl TemplateSlot {
    pub const ALL: [TemplateSlot; 4] = [
        TemplateSlot::Name,
        TemplateSlot::Time,
        TemplateSlot::Location,
        TemplateSlot::Result,
    ];

    /// Key as written between braces.
    pub fn key(&self) -> &'static str {
        match self {
            TemplateSlot::Name => "name",
            TemplateSlot::Time => "time",
            TemplateSlot::Location => "location",
            TemplateSlot::Result => "result",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Group of interchangeable response variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCategory {
    Greeting,
    HowAreYou,
    NameInquiry,
    SetNameConfirmation,
    Joke,
    Goodbye,
    ThankYou,
    Time,
    WeatherLocationPrompt,
    WeatherFetching,
    WeatherReport,
    WeatherUnavailable,
    ClarificationAbandoned,
    Thinking,
    UnderstandingFailure,
    SmallTalk,
    Affirmation,
    Negation,
}

impl ResponseCategory {
    pub const ALL: [ResponseCategory; 18] = [
        ResponseCategory::Greeting,
        ResponseCategory::HowAreYou,
        ResponseCategory::NameInquiry,
        ResponseCategory::SetNameConfirmation,
        ResponseCategory::Joke,
        ResponseCategory::Goodbye,
        ResponseCategory::ThankYou,
        ResponseCategory::Time,
        ResponseCategory::WeatherLocationPrompt,
        ResponseCategory::WeatherFetching,
        ResponseCategory::WeatherReport,
        ResponseCategory::WeatherUnavailable,
        ResponseCategory::ClarificationAbandoned,
        ResponseCategory::Thinking,
        ResponseCategory::UnderstandingFailure,
        ResponseCategory::SmallTalk,
        ResponseCategory::Affirmation,
        ResponseCategory::Negation,
    ];

    /// Slots that variants of this category are allowed to reference.
    pub fn allowed_slots(&self) -> &'static [TemplateSlot] {
        use TemplateSlot::*;
        match self {
            ResponseCategory::Time => &[Time],
            ResponseCategory::WeatherFetching => &[Location],
            ResponseCategory::WeatherReport | ResponseCategory::WeatherUnavailable => {
                &[Location, Result]
            }
            ResponseCategory::Thinking
            | ResponseCategory::Affirmation
            | ResponseCategory::Negation => &[],
            _ => &[Name],
        }
    }

    /// Variants registered for this category.
    pub fn variants(&self) -> &'static [&'static str] {
        TEMPLATES.get(self).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ResponseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// Bank
// =============================================================================

static TEMPLATES: LazyLock<HashMap<ResponseCategory, Vec<&'static str>>> = LazyLock::new(|| {
    use ResponseCategory::*;
    HashMap::from([
        (
            Greeting,
            vec![
                "Hello there, {name}! How can I assist you today?",
                "Hi, {name}! It's great to hear from you. What's on your mind?",
                "Greetings, {name}! Ready to help. What can I do?",
                "Hey {name}! Good to connect. How can I be of service?",
            ],
        ),
        (
            HowAreYou,
            vec![
                "I'm doing wonderfully, thank you for asking! And how are you feeling today?",
                "As an AI, I don't experience emotions, but I'm fully operational and ready to assist! How about yourself, {name}?",
                "All my systems are running smoothly! Thanks for checking in. How's your day progressing, {name}?",
                "I'm in top digital shape! What about you, {name}? Anything I can do to make your day better?",
            ],
        ),
        (
            NameInquiry,
            vec![
                "My name is Peanut, and I'm here to help you. What name should I call you by?",
                "I'm Peanut, your digital assistant! It's lovely to meet you. And you are?",
                "You can simply call me Peanut. May I know your name, {name}?",
                "I am Peanut. What's your name, if you don't mind me asking?",
            ],
        ),
        (
            SetNameConfirmation,
            vec![
                "It's a pleasure to finally meet you, {name}! I'll remember that.",
                "Got it, {name}! Nice to put a name to the voice. How can I help you?",
                "Hello, {name}! I've updated your name in my memory.",
                "Wonderful, {name}! Now that I know your name, what's next?",
            ],
        ),
        (
            Joke,
            vec![
                "Why don't scientists trust atoms? Because they make up everything! chuckled {name}",
                "What do you call a fake noodle? An impasta! Haha, {name}.",
                "Why did the scarecrow win an award? Because he was outstanding in his field!",
                "I told my wife she was drawing her eyebrows too high. She looked surprised. (Hope that made you smile, {name}!)",
                "Why don't skeletons fight each other? They don't have the guts! Get it, {name}?",
            ],
        ),
        (
            Goodbye,
            vec![
                "Goodbye, {name}! It was a pleasure assisting you. Have a fantastic day!",
                "See you later, {name}! Don't hesitate to call if you need anything.",
                "Farewell for now, {name}! I'll be here when you return.",
                "Until next time, {name}! Take care.",
            ],
        ),
        (
            ThankYou,
            vec![
                "You're absolutely welcome, {name}! I'm always happy to help.",
                "Anytime, {name}! It's what I'm here for.",
                "Glad I could assist, {name}. Is there anything else on your mind?",
                "No problem at all, {name}! Happy to be of service.",
            ],
        ),
        (
            Time,
            vec![
                "The current time is {time}. Hope that helps!",
                "It's {time} right now. Anything else you'd like to know?",
                "Right now it's {time}. Is there anything else I can tell you?",
            ],
        ),
        (
            WeatherLocationPrompt,
            vec![
                "I can tell you the weather, {name}! Which city are you interested in?",
                "For weather information, I need a specific city. Where would you like to know about?",
                "Please tell me the city name for the weather forecast. I'm ready to look it up!",
            ],
        ),
        (
            WeatherFetching,
            vec![
                "Ok, fetching the weather for {location}.",
                "One moment, checking the weather in {location}.",
            ],
        ),
        (
            WeatherReport,
            vec!["{result}"],
        ),
        (
            WeatherUnavailable,
            vec!["{result} Is there anything else I can help with?"],
        ),
        (
            ClarificationAbandoned,
            vec![
                "Let's skip the weather for now, {name}. What else can I do for you?",
                "No worries, {name}, we can check the weather another time. Anything else?",
            ],
        ),
        (
            Thinking,
            vec!["Hmm, let me think about that for a moment..."],
        ),
        (
            UnderstandingFailure,
            vec![
                "I'm not quite sure I grasped that, {name}. Could you try rephrasing?",
                "My apologies, I didn't catch that clearly. Could you say it a different way, {name}?",
                "Hmm, I'm a bit confused. Can you elaborate on what you mean, {name}?",
                "I'm still learning, {name}. Could you give me more context or be more specific?",
                "I think I missed something there. Can you tell me again, {name}?",
                "I'm sorry, I don't understand that request. Perhaps you could ask in a different way?",
            ],
        ),
        (
            SmallTalk,
            vec![
                "That's interesting. What else is on your mind, {name}?",
                "I see. Is there anything specific you'd like me to do or discuss, {name}?",
                "Okay, {name}. I'm here if you have more questions.",
                "I'm always ready for a new task, {name}. What would you like to do?",
                "Thinking about anything exciting, {name}?",
                "Tell me more, {name}! Or perhaps you have a question for me?",
            ],
        ),
        (
            Affirmation,
            vec!["Great!", "Alright then!", "Understood!", "Perfect!"],
        ),
        (
            Negation,
            vec![
                "Okay, no problem.",
                "Understood. Anything else?",
                "Alright. How can I help then?",
                "No worries.",
            ],
        ),
    ])
});

/// Slot keys referenced by `template`, in order of appearance.
pub fn referenced_slots(template: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                keys.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_variants() {
        for category in ResponseCategory::ALL {
            assert!(
                !category.variants().is_empty(),
                "{} has no variants",
                category
            );
        }
    }

    #[test]
    fn test_templates_only_reference_allowed_slots() {
        for category in ResponseCategory::ALL {
            let allowed = category.allowed_slots();
            for template in category.variants() {
                for key in referenced_slots(template) {
                    let slot = TemplateSlot::from_key(key)
                        .unwrap_or_else(|| panic!("unknown slot {{{key}}} in {category}"));
                    assert!(
                        allowed.contains(&slot),
                        "{category} template uses disallowed slot {{{key}}}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_category_sizes() {
        assert_eq!(ResponseCategory::Greeting.variants().len(), 4);
        assert_eq!(ResponseCategory::Joke.variants().len(), 5);
        assert_eq!(ResponseCategory::Time.variants().len(), 3);
        assert_eq!(ResponseCategory::UnderstandingFailure.variants().len(), 6);
        assert_eq!(ResponseCategory::SmallTalk.variants().len(), 6);
        assert_eq!(ResponseCategory::Thinking.variants().len(), 1);
    }

    #[test]
    fn test_jokes_address_user_by_name() {
        let jokes = ResponseCategory::Joke.variants();
        assert!(jokes[0].ends_with("make up everything! chuckled {name}"));
        let named = jokes
            .iter()
            .filter(|j| referenced_slots(j).contains(&"name"))
            .count();
        assert_eq!(named, 4);
    }

    #[test]
    fn test_weather_report_is_resolver_text() {
        assert_eq!(ResponseCategory::WeatherReport.variants(), &["{result}"]);
    }

    #[test]
    fn test_referenced_slots() {
        assert_eq!(
            referenced_slots("Hi {name}, it's {time}."),
            vec!["name", "time"]
        );
        assert!(referenced_slots("No slots here.").is_empty());
        assert!(referenced_slots("Dangling {name").is_empty());
    }

    #[test]
    fn test_slot_key_round_trip() {
        for slot in TemplateSlot::ALL {
            assert_eq!(TemplateSlot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(TemplateSlot::from_key("weather"), None);
    }
}
