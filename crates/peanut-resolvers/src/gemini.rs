//! Gemini `generateContent` query resolver.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use peanut_core::config::AssistantConfig;
use peanut_dialogue::{QueryResolver, ResolverError};

/// Answers open-ended questions through the Gemini REST API.
pub struct GeminiResolver {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiResolver")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiResolver {
    /// Build a resolver with an explicit API key.
    pub fn new(config: &AssistantConfig, api_key: String) -> Result<Self, ResolverError> {
        if api_key.trim().is_empty() {
            return Err(ResolverError::NotConfigured("empty Gemini API key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResolverError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Build a resolver reading the API key from the configured env var.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, ResolverError> {
        let api_key = config.api_key().ok_or_else(|| {
            ResolverError::NotConfigured(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(config, api_key)
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(prompt: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(response: &Value) -> Result<String, ResolverError> {
    if let Some(message) = response
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(ResolverError::Unavailable(format!("Gemini API error: {}", message)));
    }

    let parts = response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or(ResolverError::EmptyResponse)?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(ResolverError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl QueryResolver for GeminiResolver {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn resolve(&self, query: &str) -> Result<String, ResolverError> {
        tracing::debug!(model = %self.model, "Sending query to Gemini");

        let response = self
            .client
            .post(self.request_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolverError::Unavailable("Gemini request timed out".to_string())
                } else {
                    // Drop the URL so the key in the query string never reaches logs
                    ResolverError::Unavailable(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Unavailable(format!(
                "Gemini API returned {}",
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            ResolverError::Unavailable(format!("invalid Gemini response: {}", e.without_url()))
        })?;

        let answer = extract_text(&body)?;
        tracing::debug!(chars = answer.chars().count(), "Gemini answered");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> AssistantConfig {
        AssistantConfig {
            endpoint: "http://127.0.0.1:9/v1beta/".to_string(),
            timeout_secs: 2,
            ..AssistantConfig::default()
        }
    }

    // ---- construction ----

    #[test]
    fn test_request_url() {
        let resolver = GeminiResolver::new(&config(), "k".to_string()).unwrap();
        assert_eq!(
            resolver.request_url(),
            "http://127.0.0.1:9/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_blank_key_not_configured() {
        let err = GeminiResolver::new(&config(), "  ".to_string()).unwrap_err();
        assert!(matches!(err, ResolverError::NotConfigured(_)));
    }

    #[test]
    fn test_from_config_missing_env() {
        let cfg = AssistantConfig {
            api_key_env: "PEANUT_TEST_GEMINI_KEY_NEVER_SET".to_string(),
            ..config()
        };
        match GeminiResolver::from_config(&cfg) {
            Err(ResolverError::NotConfigured(msg)) => {
                assert!(msg.contains("PEANUT_TEST_GEMINI_KEY_NEVER_SET"))
            }
            other => panic!("expected NotConfigured, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let resolver = GeminiResolver::new(&config(), "super-secret".to_string()).unwrap();
        assert!(!format!("{:?}", resolver).contains("super-secret"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiResolver::request_body("why is the sky blue");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "why is the sky blue");
    }

    // ---- response parsing ----

    #[test]
    fn test_extract_text_joins_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Rayleigh " }, { "text": "scattering." }] }
            }]
        });
        assert_eq!(extract_text(&response).unwrap(), "Rayleigh scattering.");
    }

    #[test]
    fn test_extract_text_empty() {
        assert_eq!(
            extract_text(&json!({ "candidates": [] })).unwrap_err(),
            ResolverError::EmptyResponse
        );
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert_eq!(extract_text(&blank).unwrap_err(), ResolverError::EmptyResponse);
    }

    #[test]
    fn test_extract_text_api_error() {
        let response = json!({ "error": { "code": 400, "message": "API key not valid" } });
        match extract_text(&response) {
            Err(ResolverError::Unavailable(msg)) => assert!(msg.contains("API key not valid")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    // ---- transport ----

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let resolver = GeminiResolver::new(&config(), "secret-key".to_string()).unwrap();
        match resolver.resolve("hello?").await {
            Err(ResolverError::Unavailable(msg)) => assert!(!msg.contains("secret-key")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}
