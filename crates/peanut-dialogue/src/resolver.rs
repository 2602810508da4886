//! Asynchronous resolver traits and completion fencing.
//!
//! The engine hands weather lookups and open-ended queries to resolvers on
//! a Tokio task. Each dispatch carries a [`ResolutionToken`]; completions
//! whose token does not match the engine's outstanding dispatch are dropped.

use async_trait::async_trait;

use crate::error::ResolverError;

/// Answers free-form questions the rule table does not cover.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Produce an answer for `query`.
    async fn resolve(&self, query: &str) -> Result<String, ResolverError>;
}

/// Looks up current conditions for a location.
#[async_trait]
pub trait WeatherResolver: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Describe the weather at `location` in one or two sentences.
    async fn resolve(&self, location: &str) -> Result<String, ResolverError>;
}

/// Identifies one resolver dispatch within one conversation.
///
/// The generation is bumped on every reset, so completions dispatched
/// before a reset never match a later token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionToken {
    pub generation: u64,
    pub sequence: u64,
}

impl ResolutionToken {
    pub fn new(generation: u64, sequence: u64) -> Self {
        Self {
            generation,
            sequence,
        }
    }
}

/// Message sent back from a resolver task.
#[derive(Debug)]
pub(crate) struct Completion {
    pub token: ResolutionToken,
    pub outcome: Result<String, ResolverError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoResolver;

    #[async_trait]
    impl QueryResolver for EchoResolver {
        fn name(&self) -> &str {
            "echo"
        }

        async fn resolve(&self, query: &str) -> Result<String, ResolverError> {
            if query.is_empty() {
                return Err(ResolverError::EmptyResponse);
            }
            Ok(format!("echo: {}", query))
        }
    }

    #[tokio::test]
    async fn test_query_resolver_object_safe() {
        let resolver: Box<dyn QueryResolver> = Box::new(EchoResolver);
        assert_eq!(resolver.name(), "echo");
        assert_eq!(resolver.resolve("hi").await.unwrap(), "echo: hi");
        assert_eq!(
            resolver.resolve("").await.unwrap_err(),
            ResolverError::EmptyResponse
        );
    }

    #[test]
    fn test_token_equality() {
        assert_eq!(ResolutionToken::new(0, 1), ResolutionToken::new(0, 1));
        assert_ne!(ResolutionToken::new(0, 1), ResolutionToken::new(0, 2));
        assert_ne!(ResolutionToken::new(0, 1), ResolutionToken::new(1, 1));
    }
}
