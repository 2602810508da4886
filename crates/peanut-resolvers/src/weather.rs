//! Simulated weather lookups.

use std::time::Duration;

use async_trait::async_trait;

use peanut_core::config::WeatherConfig;
use peanut_dialogue::{ResolverError, WeatherResolver};

/// Known cities, matched as lowercase substrings of the requested location.
const FORECASTS: &[(&str, &str)] = &[
    (
        "maseru",
        "The weather in Maseru is currently clear with a temperature of 10 degrees Celsius. Perfect for a cool evening!",
    ),
    (
        "london",
        "The weather in London is cloudy with a temperature of 15 degrees Celsius. Don't forget your umbrella!",
    ),
    (
        "new york",
        "The weather in New York is partly cloudy with a temperature of 22 degrees Celsius. A pleasant day!",
    ),
];

/// Answers from a fixed table after an artificial delay.
#[derive(Debug, Clone)]
pub struct SimulatedWeatherResolver {
    delay: Duration,
}

impl SimulatedWeatherResolver {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(Duration::from_millis(config.delay_ms))
    }

    fn lookup(location: &str) -> Option<&'static str> {
        let wanted = location.to_lowercase();
        FORECASTS
            .iter()
            .find(|(city, _)| wanted.contains(city))
            .map(|(_, forecast)| *forecast)
    }
}

#[async_trait]
impl WeatherResolver for SimulatedWeatherResolver {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn resolve(&self, location: &str) -> Result<String, ResolverError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match Self::lookup(location) {
            Some(forecast) => {
                tracing::debug!(location = %location, "Simulated forecast found");
                Ok(forecast.to_string())
            }
            None => Err(ResolverError::LocationNotFound(location.to_string())),
        }
    }
}
