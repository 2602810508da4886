//! Error types for the dialogue engine and its resolvers.

use crate::state::{DialogueEvent, DialoguePhase};
use crate::types::ResolutionKind;
use peanut_core::error::PeanutError;

/// Errors from turn processing.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("Utterance is empty")]
    EmptyUtterance,
    #[error("A {0} is still pending; wait for its reply before the next turn")]
    ResolutionPending(ResolutionKind),
    #[error("Utterance too long: {len} characters (max {max})")]
    UtteranceTooLong { len: usize, max: usize },
    #[error("Invalid dialogue transition: {0} on {1}")]
    InvalidTransition(DialoguePhase, DialogueEvent),
    #[error("Resolvers need a running Tokio runtime")]
    NoRuntime,
}

/// Errors reported by weather and external query resolvers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    #[error("No weather data for location: {0}")]
    LocationNotFound(String),
    #[error("Resolver not configured: {0}")]
    NotConfigured(String),
    #[error("Resolver unavailable: {0}")]
    Unavailable(String),
    #[error("Resolver returned an empty response")]
    EmptyResponse,
}

impl ResolverError {
    /// Sentence spoken to the user in place of a resolved answer.
    pub fn apology(&self) -> String {
        match self {
            ResolverError::LocationNotFound(location) => {
                format!("I couldn't find the weather for {location}. My apologies!")
            }
            ResolverError::NotConfigured(_) => {
                "My knowledge service isn't set up yet. Please check the API key configuration."
                    .to_string()
            }
            ResolverError::Unavailable(_) => {
                "I'm sorry, I encountered an error trying to process that. Please try again."
                    .to_string()
            }
            ResolverError::EmptyResponse => {
                "I'm sorry, I couldn't generate a clear response from my knowledge base."
                    .to_string()
            }
        }
    }
}

impl From<DialogueError> for PeanutError {
    fn from(err: DialogueError) -> Self {
        PeanutError::Dialogue(err.to_string())
    }
}

impl From<ResolverError> for PeanutError {
    fn from(err: ResolverError) -> Self {
        PeanutError::Resolver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_error_display() {
        assert_eq!(DialogueError::EmptyUtterance.to_string(), "Utterance is empty");

        let err = DialogueError::ResolutionPending(ResolutionKind::Weather);
        assert_eq!(
            err.to_string(),
            "A weather lookup is still pending; wait for its reply before the next turn"
        );

        let err = DialogueError::UtteranceTooLong {
            len: 2001,
            max: 2000,
        };
        assert_eq!(
            err.to_string(),
            "Utterance too long: 2001 characters (max 2000)"
        );

        let err = DialogueError::InvalidTransition(
            DialoguePhase::AwaitingWeather,
            DialogueEvent::LocationMissing,
        );
        assert_eq!(
            err.to_string(),
            "Invalid dialogue transition: awaiting_weather on location_missing"
        );

        assert_eq!(
            DialogueError::NoRuntime.to_string(),
            "Resolvers need a running Tokio runtime"
        );
    }

    #[test]
    fn test_resolver_error_display() {
        let err = ResolverError::LocationNotFound("atlantis".to_string());
        assert_eq!(err.to_string(), "No weather data for location: atlantis");

        let err = ResolverError::NotConfigured("GEMINI_API_KEY is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Resolver not configured: GEMINI_API_KEY is not set"
        );

        let err = ResolverError::Unavailable("HTTP 503".to_string());
        assert_eq!(err.to_string(), "Resolver unavailable: HTTP 503");

        assert_eq!(
            ResolverError::EmptyResponse.to_string(),
            "Resolver returned an empty response"
        );
    }

    #[test]
    fn test_apology_never_leaks_details() {
        let err = ResolverError::Unavailable("connection refused at 10.0.0.1".to_string());
        assert!(!err.apology().contains("10.0.0.1"));

        let err = ResolverError::LocationNotFound("Atlantis".to_string());
        assert_eq!(
            err.apology(),
            "I couldn't find the weather for Atlantis. My apologies!"
        );
    }

    #[test]
    fn test_into_peanut_error() {
        let err: PeanutError = DialogueError::NoRuntime.into();
        assert!(matches!(err, PeanutError::Dialogue(_)));

        let err: PeanutError = ResolverError::EmptyResponse.into();
        assert!(matches!(err, PeanutError::Resolver(_)));
    }
}
