//! Dialogue memory and the conversation phase machine.
//!
//! Valid phase transitions:
//! - Idle -> Idle (plain reply)
//! - Idle -> AwaitingLocation (weather asked without a city)
//! - AwaitingLocation -> AwaitingLocation (clarification failed, ask again)
//! - AwaitingLocation -> Idle (city supplied, or retries exhausted)
//! - Idle -> AwaitingWeather / AwaitingExternalResult (resolver dispatched)
//! - AwaitingWeather / AwaitingExternalResult -> Idle (resolver completed)
//! - any -> Idle (reset)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DialogueError;
use crate::types::Intent;

/// Default form of address before the user introduces themselves.
pub const DEFAULT_USER_NAME: &str = "there";

// =============================================================================
// DialoguePhase
// =============================================================================

/// Where the conversation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    /// Ready for any utterance.
    #[default]
    Idle,
    /// The previous turn asked which city the weather is for.
    AwaitingLocation,
    /// A weather lookup is in flight.
    AwaitingWeather,
    /// An open-ended query is with the external resolver.
    AwaitingExternalResult,
}

impl fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialoguePhase::Idle => write!(f, "idle"),
            DialoguePhase::AwaitingLocation => write!(f, "awaiting_location"),
            DialoguePhase::AwaitingWeather => write!(f, "awaiting_weather"),
            DialoguePhase::AwaitingExternalResult => write!(f, "awaiting_external_result"),
        }
    }
}

/// Something that happened during a turn and moves the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueEvent {
    Replied,
    LocationMissing,
    LocationResolved,
    ClarificationFailed,
    ClarificationAbandoned,
    WeatherDispatched,
    QueryDispatched,
    ResolutionCompleted,
    Reset,
}

impl fmt::Display for DialogueEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DialogueEvent::Replied => "replied",
            DialogueEvent::LocationMissing => "location_missing",
            DialogueEvent::LocationResolved => "location_resolved",
            DialogueEvent::ClarificationFailed => "clarification_failed",
            DialogueEvent::ClarificationAbandoned => "clarification_abandoned",
            DialogueEvent::WeatherDispatched => "weather_dispatched",
            DialogueEvent::QueryDispatched => "query_dispatched",
            DialogueEvent::ResolutionCompleted => "resolution_completed",
            DialogueEvent::Reset => "reset",
        };
        f.write_str(label)
    }
}

impl DialoguePhase {
    /// Phase reached by applying `event`, or an error if the event is not
    /// valid from this phase.
    pub fn transition(self, event: DialogueEvent) -> Result<DialoguePhase, DialogueError> {
        use DialogueEvent as E;
        use DialoguePhase as P;

        let next = match (self, event) {
            (_, E::Reset) => P::Idle,
            (P::Idle, E::Replied) => P::Idle,
            (P::Idle, E::LocationMissing) => P::AwaitingLocation,
            (P::Idle, E::WeatherDispatched) => P::AwaitingWeather,
            (P::Idle, E::QueryDispatched) => P::AwaitingExternalResult,
            (P::AwaitingLocation, E::ClarificationFailed) => P::AwaitingLocation,
            (P::AwaitingLocation, E::LocationResolved) => P::Idle,
            (P::AwaitingLocation, E::ClarificationAbandoned) => P::Idle,
            (P::AwaitingWeather | P::AwaitingExternalResult, E::ResolutionCompleted) => P::Idle,
            (from, event) => return Err(DialogueError::InvalidTransition(from, event)),
        };
        Ok(next)
    }

    /// Whether a resolver dispatch is outstanding.
    pub fn is_resolving(&self) -> bool {
        matches!(
            self,
            DialoguePhase::AwaitingWeather | DialoguePhase::AwaitingExternalResult
        )
    }
}

// =============================================================================
// DialogueState
// =============================================================================

/// Per-session dialogue memory.
///
/// Owned by a single engine; the engine is the only writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueState {
    pub(crate) user_name: String,
    pub(crate) last_intent: Intent,
    pub(crate) asked_for_name: bool,
    pub(crate) clarification_attempts: u32,
    phase: DialoguePhase,
    default_user_name: String,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self::new(DEFAULT_USER_NAME)
    }
}

impl DialogueState {
    /// Fresh state addressing the user as `default_user_name`.
    pub fn new(default_user_name: &str) -> Self {
        Self {
            user_name: default_user_name.to_string(),
            last_intent: Intent::Unknown,
            asked_for_name: false,
            clarification_attempts: 0,
            phase: DialoguePhase::Idle,
            default_user_name: default_user_name.to_string(),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn last_intent(&self) -> Intent {
        self.last_intent
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub fn asked_for_name(&self) -> bool {
        self.asked_for_name
    }

    /// Consecutive failed clarification turns.
    pub fn clarification_attempts(&self) -> u32 {
        self.clarification_attempts
    }

    /// True iff the previous turn asked for a weather location.
    pub fn awaiting_clarification(&self) -> bool {
        self.phase == DialoguePhase::AwaitingLocation
    }

    /// Whether the user has not introduced themselves yet.
    pub fn has_default_name(&self) -> bool {
        self.user_name == self.default_user_name
    }

    /// Move the phase machine forward.
    pub(crate) fn apply(&mut self, event: DialogueEvent) -> Result<(), DialogueError> {
        let next = self.phase.transition(event)?;
        if next != self.phase {
            tracing::debug!("Dialogue phase: {} -> {} ({})", self.phase, next, event);
        }
        self.phase = next;
        Ok(())
    }

    /// Restore initial values, keeping the configured default name.
    pub fn reset(&mut self) {
        // Reset is accepted from every phase
        let next = self
            .phase
            .transition(DialogueEvent::Reset)
            .unwrap_or_default();
        if next != self.phase {
            tracing::debug!("Dialogue phase: {} -> {} ({})", self.phase, next, DialogueEvent::Reset);
        }
        self.phase = next;
        self.user_name = self.default_user_name.clone();
        self.last_intent = Intent::Unknown;
        self.asked_for_name = false;
        self.clarification_attempts = 0;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(DialoguePhase::Idle.to_string(), "idle");
        assert_eq!(
            DialoguePhase::AwaitingLocation.to_string(),
            "awaiting_location"
        );
        assert_eq!(DialoguePhase::AwaitingWeather.to_string(), "awaiting_weather");
        assert_eq!(
            DialoguePhase::AwaitingExternalResult.to_string(),
            "awaiting_external_result"
        );
    }

    #[test]
    fn test_valid_transitions() {
        use DialogueEvent as E;
        use DialoguePhase as P;

        assert_eq!(P::Idle.transition(E::Replied).unwrap(), P::Idle);
        assert_eq!(
            P::Idle.transition(E::LocationMissing).unwrap(),
            P::AwaitingLocation
        );
        assert_eq!(
            P::AwaitingLocation.transition(E::ClarificationFailed).unwrap(),
            P::AwaitingLocation
        );
        assert_eq!(
            P::AwaitingLocation.transition(E::LocationResolved).unwrap(),
            P::Idle
        );
        assert_eq!(
            P::AwaitingLocation
                .transition(E::ClarificationAbandoned)
                .unwrap(),
            P::Idle
        );
        assert_eq!(
            P::Idle.transition(E::WeatherDispatched).unwrap(),
            P::AwaitingWeather
        );
        assert_eq!(
            P::Idle.transition(E::QueryDispatched).unwrap(),
            P::AwaitingExternalResult
        );
        assert_eq!(
            P::AwaitingWeather.transition(E::ResolutionCompleted).unwrap(),
            P::Idle
        );
        assert_eq!(
            P::AwaitingExternalResult
                .transition(E::ResolutionCompleted)
                .unwrap(),
            P::Idle
        );
    }

    #[test]
    fn test_reset_from_every_phase() {
        for phase in [
            DialoguePhase::Idle,
            DialoguePhase::AwaitingLocation,
            DialoguePhase::AwaitingWeather,
            DialoguePhase::AwaitingExternalResult,
        ] {
            assert_eq!(
                phase.transition(DialogueEvent::Reset).unwrap(),
                DialoguePhase::Idle
            );
        }
    }

    #[test]
    fn test_invalid_transitions() {
        use DialogueEvent as E;
        use DialoguePhase as P;

        // No new dispatch while one is in flight
        assert!(P::AwaitingWeather.transition(E::QueryDispatched).is_err());
        assert!(P::AwaitingExternalResult
            .transition(E::WeatherDispatched)
            .is_err());
        // Clarification events only while clarifying
        assert!(P::Idle.transition(E::LocationResolved).is_err());
        assert!(P::Idle.transition(E::ClarificationFailed).is_err());
        // Completion only while resolving
        assert!(P::Idle.transition(E::ResolutionCompleted).is_err());
        // Dispatch requires leaving clarification first
        assert!(P::AwaitingLocation.transition(E::WeatherDispatched).is_err());
        assert!(P::AwaitingLocation.transition(E::Replied).is_err());
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = DialoguePhase::Idle
            .transition(DialogueEvent::ResolutionCompleted)
            .unwrap_err();
        assert!(matches!(
            err,
            DialogueError::InvalidTransition(DialoguePhase::Idle, DialogueEvent::ResolutionCompleted)
        ));
    }

    #[test]
    fn test_is_resolving() {
        assert!(!DialoguePhase::Idle.is_resolving());
        assert!(!DialoguePhase::AwaitingLocation.is_resolving());
        assert!(DialoguePhase::AwaitingWeather.is_resolving());
        assert!(DialoguePhase::AwaitingExternalResult.is_resolving());
    }

    #[test]
    fn test_initial_state() {
        let state = DialogueState::default();
        assert_eq!(state.user_name(), "there");
        assert_eq!(state.last_intent(), Intent::Unknown);
        assert_eq!(state.phase(), DialoguePhase::Idle);
        assert!(!state.awaiting_clarification());
        assert!(!state.asked_for_name());
        assert!(state.has_default_name());
        assert_eq!(state.clarification_attempts(), 0);
    }

    #[test]
    fn test_apply_tracks_clarification() {
        let mut state = DialogueState::default();
        state.apply(DialogueEvent::LocationMissing).unwrap();
        assert!(state.awaiting_clarification());
        state.apply(DialogueEvent::LocationResolved).unwrap();
        assert!(!state.awaiting_clarification());
    }

    #[test]
    fn test_apply_invalid_keeps_phase() {
        let mut state = DialogueState::default();
        state.apply(DialogueEvent::WeatherDispatched).unwrap();
        assert!(state.apply(DialogueEvent::LocationMissing).is_err());
        assert_eq!(state.phase(), DialoguePhase::AwaitingWeather);
    }

    #[test]
    fn test_reset_leaves_resolving_phase() {
        let mut state = DialogueState::default();
        state.apply(DialogueEvent::QueryDispatched).unwrap();
        assert!(state.phase().is_resolving());

        state.reset();
        assert_eq!(state.phase(), DialoguePhase::Idle);
        assert!(!state.phase().is_resolving());
    }

    #[test]
    fn test_reset_restores_configured_default() {
        let mut state = DialogueState::new("friend");
        state.user_name = "thabo".to_string();
        state.last_intent = Intent::TellJoke;
        state.asked_for_name = true;
        state.clarification_attempts = 2;
        state.apply(DialogueEvent::LocationMissing).unwrap();
        assert!(!state.has_default_name());

        state.reset();
        assert_eq!(state, DialogueState::new("friend"));
        assert!(state.has_default_name());

        // Idempotent
        state.reset();
        assert_eq!(state, DialogueState::new("friend"));
    }
}
