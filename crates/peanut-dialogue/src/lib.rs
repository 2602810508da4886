//! Turn-based dialogue engine for Peanut.
//!
//! Classifies normalized utterances into intents, extracts the slots those
//! intents need, keeps per-session dialogue memory (including the weather
//! location clarification sub-dialogue), renders varied responses, and hands
//! open-ended or location lookups to asynchronous resolvers.

pub mod classifier;
pub mod engine;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod response;
pub mod state;
pub mod templates;
pub mod types;

pub use classifier::{Classification, IntentClassifier};
pub use engine::DialogueEngine;
pub use error::{DialogueError, ResolverError};
pub use resolver::{QueryResolver, ResolutionToken, WeatherResolver};
pub use response::{ResponseGenerator, SlotValues};
pub use state::{DialogueEvent, DialoguePhase, DialogueState};
pub use templates::{ResponseCategory, TemplateSlot};
pub use types::{
    normalize_utterance, AsyncReply, Entities, Intent, ReplyKind, ResolutionKind, Slot, TurnReply,
};
