//! Turn controller.
//!
//! [`DialogueEngine`] runs one conversation: it classifies each utterance,
//! drives the clarification sub-dialogue, renders replies, and hands weather
//! lookups and open-ended questions to resolvers on Tokio tasks. Resolver
//! results come back through a channel owned by the engine and are picked up
//! with [`DialogueEngine::next_async_reply`].

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveTime};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use peanut_core::config::DialogueConfig;

use crate::classifier::{Classification, IntentClassifier};
use crate::error::{DialogueError, ResolverError};
use crate::resolver::{Completion, QueryResolver, ResolutionToken, WeatherResolver};
use crate::response::{format_clock, with_suffix, ResponseGenerator, SlotValues};
use crate::state::{DialogueEvent, DialogueState};
use crate::templates::{self, ResponseCategory};
use crate::types::{AsyncReply, Entities, Intent, ReplyKind, ResolutionKind, Slot, TurnReply};

/// Source of the current wall-clock time for "what time is it".
pub type ClockFn = Box<dyn Fn() -> NaiveTime + Send + Sync>;

/// The single resolver dispatch the engine is waiting on.
#[derive(Debug)]
struct PendingResolution {
    token: ResolutionToken,
    kind: ResolutionKind,
    location: Option<String>,
}

/// Runs one conversation session.
pub struct DialogueEngine {
    classifier: IntentClassifier,
    responses: ResponseGenerator,
    state: DialogueState,
    entities: Entities,
    max_utterance_chars: usize,
    max_clarification_retries: Option<u32>,
    query_resolver: Arc<dyn QueryResolver>,
    weather_resolver: Arc<dyn WeatherResolver>,
    clock: ClockFn,
    generation: u64,
    sequence: u64,
    pending: Option<PendingResolution>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl DialogueEngine {
    pub fn new(
        config: &DialogueConfig,
        query_resolver: Arc<dyn QueryResolver>,
        weather_resolver: Arc<dyn WeatherResolver>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        tracing::debug!(
            query_resolver = query_resolver.name(),
            weather_resolver = weather_resolver.name(),
            "Dialogue engine created"
        );
        Self {
            classifier: IntentClassifier::new(),
            responses: ResponseGenerator::new(config.response_seed),
            state: DialogueState::new(&config.default_user_name),
            entities: Entities::new(),
            max_utterance_chars: config.max_utterance_chars,
            max_clarification_retries: config.max_clarification_retries,
            query_resolver,
            weather_resolver,
            clock: Box::new(|| Local::now().time()),
            generation: 0,
            sequence: 0,
            pending: None,
            completion_tx,
            completion_rx,
        }
    }

    /// Replace the wall clock used for time replies.
    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = clock;
        self
    }

    // =========================================================================
    // Session control
    // =========================================================================

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Slots extracted during the most recent turn.
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn is_awaiting_clarification(&self) -> bool {
        self.state.awaiting_clarification()
    }

    /// Whether the last completed turn was a farewell.
    pub fn is_goodbye(&self) -> bool {
        self.state.last_intent == Intent::Goodbye
    }

    /// Kind of the outstanding resolver dispatch, if any.
    pub fn pending_resolution(&self) -> Option<ResolutionKind> {
        self.pending.as_ref().map(|p| p.kind)
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start the conversation over.
    ///
    /// Any in-flight resolver keeps running, but its completion is discarded.
    pub fn reset_conversation(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                generation = pending.token.generation,
                sequence = pending.token.sequence,
                "Abandoning outstanding {}",
                pending.kind
            );
        }
        self.generation += 1;
        self.sequence = 0;
        self.state.reset();
        self.entities.clear();
        tracing::info!(generation = self.generation, "Conversation reset");
    }

    // =========================================================================
    // Turns
    // =========================================================================

    /// Process one normalized utterance and return the immediate reply.
    ///
    /// Weather lookups and unrecognized input return an interim reply; the
    /// final text arrives through [`next_async_reply`](Self::next_async_reply),
    /// which must be awaited before the next turn.
    pub fn process_turn(&mut self, text: &str) -> Result<TurnReply, DialogueError> {
        if let Some(pending) = &self.pending {
            return Err(DialogueError::ResolutionPending(pending.kind));
        }
        if text.trim().is_empty() {
            return Err(DialogueError::EmptyUtterance);
        }
        let len = text.chars().count();
        if len > self.max_utterance_chars {
            return Err(DialogueError::UtteranceTooLong {
                len,
                max: self.max_utterance_chars,
            });
        }

        let was_clarifying = self.state.awaiting_clarification();

        let Classification {
            mut intent,
            mut entities,
            user_name,
        } = self.classifier.classify(text);

        if was_clarifying {
            if entities.location().is_none() {
                if let Some(location) = self.classifier.extract_fallback_location(text) {
                    entities.insert(Slot::Location, &location);
                }
            }
            if entities.location().is_some() {
                intent = Intent::GetWeather;
            }
        }

        let unresolved = was_clarifying && entities.location().is_none();

        // Nothing is touched until the dispatch is known to be possible
        let runtime = if !unresolved && Self::needs_resolver(intent, &entities) {
            Some(Handle::try_current().map_err(|_| DialogueError::NoRuntime)?)
        } else {
            None
        };

        if let Some(name) = user_name {
            tracing::info!(user_name = %name, "User name updated");
            self.state.user_name = name;
        }
        self.entities = entities;

        if unresolved {
            return self.clarification_failed();
        }
        if was_clarifying {
            self.state.clarification_attempts = 0;
            self.state.apply(DialogueEvent::LocationResolved)?;
        }

        tracing::debug!(intent = %intent, clarified = was_clarifying, "Turn classified");
        self.respond(intent, text, runtime)
    }

    /// Wait for the outstanding resolver and return its final reply.
    ///
    /// Returns `None` immediately when nothing is outstanding. Completions
    /// left over from before a reset are skipped.
    pub async fn next_async_reply(&mut self) -> Option<AsyncReply> {
        loop {
            let expected = self.pending.as_ref()?.token;
            let completion = self.completion_rx.recv().await?;
            if completion.token != expected {
                tracing::debug!(
                    generation = completion.token.generation,
                    sequence = completion.token.sequence,
                    "Discarding stale resolver completion"
                );
                continue;
            }
            let pending = self.pending.take()?;
            return Some(self.complete(pending, completion.outcome));
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn needs_resolver(intent: Intent, entities: &Entities) -> bool {
        match intent {
            Intent::GetWeather => entities.contains(Slot::Location),
            Intent::Unknown => true,
            other => other.is_meta(),
        }
    }

    fn render(&mut self, category: ResponseCategory, values: SlotValues) -> String {
        self.responses.render(category, &values)
    }

    fn respond(
        &mut self,
        intent: Intent,
        text: &str,
        runtime: Option<Handle>,
    ) -> Result<TurnReply, DialogueError> {
        let name = self.state.user_name.clone();
        let reply = match intent {
            Intent::Greeting => {
                let reply = self.render(ResponseCategory::Greeting, SlotValues::new().name(&name));
                if self.state.has_default_name() && !self.state.asked_for_name {
                    self.state.asked_for_name = true;
                    with_suffix(reply, templates::NAME_REQUEST_SUFFIX)
                } else {
                    reply
                }
            }
            Intent::HowAreYou => {
                self.render(ResponseCategory::HowAreYou, SlotValues::new().name(&name))
            }
            Intent::NameInquiry => {
                self.state.asked_for_name = true;
                self.render(ResponseCategory::NameInquiry, SlotValues::new().name(&name))
            }
            Intent::SetName => {
                self.state.asked_for_name = true;
                self.render(
                    ResponseCategory::SetNameConfirmation,
                    SlotValues::new().name(&name),
                )
            }
            Intent::TellJoke => {
                let joke = self.render(ResponseCategory::Joke, SlotValues::new().name(&name));
                with_suffix(joke, templates::JOKE_FOLLOW_UP)
            }
            Intent::Goodbye => {
                self.render(ResponseCategory::Goodbye, SlotValues::new().name(&name))
            }
            Intent::ThankYou => {
                self.render(ResponseCategory::ThankYou, SlotValues::new().name(&name))
            }
            Intent::WhatTime => {
                let now = format_clock((self.clock)());
                self.render(ResponseCategory::Time, SlotValues::new().time(now))
            }
            Intent::Affirmation => {
                let suffix = if self.state.last_intent == Intent::TellJoke {
                    templates::AFFIRMATION_AFTER_JOKE
                } else {
                    templates::AFFIRMATION_FOLLOW_UP
                };
                let reply = self.render(ResponseCategory::Affirmation, SlotValues::new());
                with_suffix(reply, suffix)
            }
            Intent::Negation => {
                let reply = self.render(ResponseCategory::Negation, SlotValues::new());
                with_suffix(reply, templates::NEGATION_FOLLOW_UP)
            }
            Intent::SmallTalk => {
                self.render(ResponseCategory::SmallTalk, SlotValues::new().name(&name))
            }
            Intent::GetWeather => {
                return match self.entities.location().map(str::to_string) {
                    Some(location) => self.dispatch_weather(location, runtime),
                    None => self.prompt_for_location(),
                };
            }
            // Meta intents never come out of classification
            Intent::Unknown | Intent::ExternalQuery | Intent::GetWeatherClarification => {
                return self.dispatch_query(text, runtime);
            }
        };

        self.state.apply(DialogueEvent::Replied)?;
        self.state.last_intent = intent;
        let kind = if intent == Intent::Goodbye {
            ReplyKind::Farewell
        } else {
            ReplyKind::Final
        };
        Ok(TurnReply {
            text: reply,
            kind,
            intent,
        })
    }

    fn prompt_for_location(&mut self) -> Result<TurnReply, DialogueError> {
        let name = self.state.user_name.clone();
        let text = self.render(
            ResponseCategory::WeatherLocationPrompt,
            SlotValues::new().name(name),
        );
        self.state.apply(DialogueEvent::LocationMissing)?;
        self.state.last_intent = Intent::GetWeatherClarification;
        self.state.clarification_attempts = 0;
        tracing::debug!("Weather requested without a location");
        Ok(TurnReply {
            text,
            kind: ReplyKind::Clarification,
            intent: Intent::GetWeather,
        })
    }

    fn clarification_failed(&mut self) -> Result<TurnReply, DialogueError> {
        self.state.clarification_attempts += 1;
        let attempts = self.state.clarification_attempts;
        let name = self.state.user_name.clone();

        if let Some(max) = self.max_clarification_retries {
            if attempts > max {
                tracing::info!(attempts, "Giving up on weather location");
                self.state.apply(DialogueEvent::ClarificationAbandoned)?;
                self.state.clarification_attempts = 0;
                self.state.last_intent = Intent::Unknown;
                let text = self.render(
                    ResponseCategory::ClarificationAbandoned,
                    SlotValues::new().name(name),
                );
                return Ok(TurnReply {
                    text,
                    kind: ReplyKind::Final,
                    intent: Intent::Unknown,
                });
            }
        }

        self.state.apply(DialogueEvent::ClarificationFailed)?;
        self.state.last_intent = Intent::GetWeatherClarification;
        tracing::debug!(attempts, "Still waiting for a weather location");
        let failure = self.render(
            ResponseCategory::UnderstandingFailure,
            SlotValues::new().name(name),
        );
        Ok(TurnReply {
            text: with_suffix(failure, templates::CLARIFICATION_REMINDER),
            kind: ReplyKind::Clarification,
            intent: Intent::GetWeatherClarification,
        })
    }

    /// Run `resolution` on its own task and report its outcome.
    ///
    /// A supervising task waits on the resolver task so that a panic or
    /// cancellation still produces a completion.
    fn spawn_resolution<F>(
        &self,
        runtime: &Handle,
        token: ResolutionToken,
        kind: ResolutionKind,
        resolution: F,
    ) where
        F: Future<Output = Result<String, ResolverError>> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        let task = runtime.spawn(resolution);
        runtime.spawn(async move {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(sequence = token.sequence, "{} task failed: {}", kind, e);
                    Err(ResolverError::Unavailable(format!("{} task failed", kind)))
                }
            };
            if tx.send(Completion { token, outcome }).is_err() {
                tracing::debug!("Engine dropped before {} finished", kind);
            }
        });
    }

    fn next_token(&mut self) -> ResolutionToken {
        self.sequence += 1;
        ResolutionToken::new(self.generation, self.sequence)
    }

    fn dispatch_weather(
        &mut self,
        location: String,
        runtime: Option<Handle>,
    ) -> Result<TurnReply, DialogueError> {
        let runtime = runtime.ok_or(DialogueError::NoRuntime)?;
        self.state.apply(DialogueEvent::WeatherDispatched)?;
        self.state.last_intent = Intent::GetWeather;

        let token = self.next_token();
        let resolver = Arc::clone(&self.weather_resolver);
        let subject = location.clone();
        self.spawn_resolution(&runtime, token, ResolutionKind::Weather, async move {
            resolver.resolve(&subject).await
        });

        tracing::info!(location = %location, sequence = token.sequence, "Weather lookup dispatched");
        let text = self.render(
            ResponseCategory::WeatherFetching,
            SlotValues::new().location(&location),
        );
        self.pending = Some(PendingResolution {
            token,
            kind: ResolutionKind::Weather,
            location: Some(location),
        });
        Ok(TurnReply {
            text,
            kind: ReplyKind::Interim,
            intent: Intent::GetWeather,
        })
    }

    fn dispatch_query(
        &mut self,
        text: &str,
        runtime: Option<Handle>,
    ) -> Result<TurnReply, DialogueError> {
        let runtime = runtime.ok_or(DialogueError::NoRuntime)?;
        self.state.apply(DialogueEvent::QueryDispatched)?;
        self.state.last_intent = Intent::ExternalQuery;

        let token = self.next_token();
        let resolver = Arc::clone(&self.query_resolver);
        let query = text.to_string();
        self.spawn_resolution(&runtime, token, ResolutionKind::ExternalQuery, async move {
            resolver.resolve(&query).await
        });

        tracing::info!(sequence = token.sequence, "External query dispatched");
        let reply = self.render(ResponseCategory::Thinking, SlotValues::new());
        self.pending = Some(PendingResolution {
            token,
            kind: ResolutionKind::ExternalQuery,
            location: None,
        });
        Ok(TurnReply {
            text: reply,
            kind: ReplyKind::Interim,
            intent: Intent::Unknown,
        })
    }

    fn complete(
        &mut self,
        pending: PendingResolution,
        outcome: Result<String, ResolverError>,
    ) -> AsyncReply {
        let outcome = outcome.and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(ResolverError::EmptyResponse)
            } else {
                Ok(text.to_string())
            }
        });
        let resolved = outcome.is_ok();

        let text = match pending.kind {
            ResolutionKind::Weather => {
                let location = pending.location.unwrap_or_default();
                match outcome {
                    Ok(report) => self.render(
                        ResponseCategory::WeatherReport,
                        SlotValues::new().location(&location).result(report),
                    ),
                    Err(err) => {
                        tracing::warn!(location = %location, "Weather lookup failed: {}", err);
                        let apology = match err {
                            ResolverError::EmptyResponse => {
                                ResolverError::LocationNotFound(location.clone()).apology()
                            }
                            other => other.apology(),
                        };
                        self.render(
                            ResponseCategory::WeatherUnavailable,
                            SlotValues::new().location(&location).result(apology),
                        )
                    }
                }
            }
            ResolutionKind::ExternalQuery => match outcome {
                Ok(answer) => {
                    self.state.last_intent = Intent::SmallTalk;
                    answer
                }
                Err(err) => {
                    tracing::warn!("External query failed: {}", err);
                    self.state.last_intent = Intent::Unknown;
                    err.apology()
                }
            },
        };

        if self.state.phase().is_resolving() {
            if let Err(e) = self.state.apply(DialogueEvent::ResolutionCompleted) {
                tracing::warn!("Resolution completion rejected: {}", e);
            }
        } else {
            tracing::warn!(phase = %self.state.phase(), "Resolution completed outside a resolving phase");
        }
        tracing::debug!(kind = %pending.kind, resolved, "Resolution completed");

        AsyncReply {
            text,
            kind: pending.kind,
            resolved,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
