//! Shared configuration and error types for the Peanut assistant.

pub mod config;
pub mod error;

pub use config::{AssistantConfig, DialogueConfig, GeneralConfig, PeanutConfig, WeatherConfig};
pub use error::{PeanutError, Result};
