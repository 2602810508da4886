//! Query resolver used when no external service is configured.

use async_trait::async_trait;

use peanut_dialogue::{QueryResolver, ResolverError};

/// Declines every query with [`ResolverError::NotConfigured`].
#[derive(Debug, Clone, Default)]
pub struct OfflineResolver;

impl OfflineResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryResolver for OfflineResolver {
    fn name(&self) -> &str {
        "offline"
    }

    async fn resolve(&self, query: &str) -> Result<String, ResolverError> {
        tracing::debug!(chars = query.chars().count(), "Declining external query offline");
        Err(ResolverError::NotConfigured(
            "no external query service configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_not_configured() {
        let resolver = OfflineResolver::new();
        let err = resolver.resolve("what is the capital of france").await.unwrap_err();
        assert!(matches!(err, ResolverError::NotConfigured(_)));
        assert_eq!(
            err.apology(),
            "My knowledge service isn't set up yet. Please check the API key configuration."
        );
    }
}
