//! Resolver implementations for the Peanut dialogue engine.
//!
//! - [`SimulatedWeatherResolver`]: canned forecasts after a configurable delay.
//! - [`GeminiResolver`]: open-ended questions answered by the Gemini
//!   `generateContent` API.
//! - [`OfflineResolver`]: stands in when no external service is configured.

pub mod gemini;
pub mod offline;
pub mod weather;

use std::sync::Arc;

use peanut_core::config::{AssistantConfig, WeatherConfig};
use peanut_dialogue::{QueryResolver, WeatherResolver};

pub use gemini::GeminiResolver;
pub use offline::OfflineResolver;
pub use weather::SimulatedWeatherResolver;

/// Pick the query resolver for `config`.
///
/// Falls back to [`OfflineResolver`] when `offline` is set, the provider is
/// "offline" or unknown, or the Gemini client cannot be built.
pub fn build_query_resolver(config: &AssistantConfig, offline: bool) -> Arc<dyn QueryResolver> {
    if offline {
        tracing::info!("External queries disabled (offline mode)");
        return Arc::new(OfflineResolver::new());
    }

    match config.provider.as_str() {
        "gemini" => match GeminiResolver::from_config(config) {
            Ok(resolver) => {
                tracing::info!(model = %config.model, "Gemini query resolver ready");
                Arc::new(resolver)
            }
            Err(e) => {
                tracing::warn!("Gemini unavailable, answering offline: {}", e);
                Arc::new(OfflineResolver::new())
            }
        },
        "offline" => Arc::new(OfflineResolver::new()),
        other => {
            tracing::warn!("Unknown assistant provider '{}', answering offline", other);
            Arc::new(OfflineResolver::new())
        }
    }
}

/// Build the weather resolver from config.
pub fn build_weather_resolver(config: &WeatherConfig) -> Arc<dyn WeatherResolver> {
    Arc::new(SimulatedWeatherResolver::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_flag_wins() {
        let resolver = build_query_resolver(&AssistantConfig::default(), true);
        assert_eq!(resolver.name(), "offline");
    }

    #[test]
    fn test_offline_provider() {
        let config = AssistantConfig {
            provider: "offline".to_string(),
            ..AssistantConfig::default()
        };
        assert_eq!(build_query_resolver(&config, false).name(), "offline");
    }

    #[test]
    fn test_unknown_provider_falls_back() {
        let config = AssistantConfig {
            provider: "mystery".to_string(),
            ..AssistantConfig::default()
        };
        assert_eq!(build_query_resolver(&config, false).name(), "offline");
    }

    #[test]
    fn test_gemini_without_key_falls_back() {
        let config = AssistantConfig {
            api_key_env: "PEANUT_TEST_UNSET_GEMINI_KEY".to_string(),
            ..AssistantConfig::default()
        };
        assert_eq!(build_query_resolver(&config, false).name(), "offline");
    }

    #[test]
    fn test_weather_resolver_from_config() {
        let resolver = build_weather_resolver(&WeatherConfig { delay_ms: 0 });
        assert_eq!(resolver.name(), "simulated");
    }
}
