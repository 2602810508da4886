use thiserror::Error;

/// Top-level error type for the Peanut assistant.
///
/// Subsystem crates keep their own error enums and convert into this one
/// at the application boundary so `?` works across crates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PeanutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dialogue error: {0}")]
    Dialogue(String),

    #[error("Resolver error: {0}")]
    Resolver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PeanutError {
    fn from(err: toml::de::Error) -> Self {
        PeanutError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PeanutError {
    fn from(err: toml::ser::Error) -> Self {
        PeanutError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PeanutError {
    fn from(err: serde_json::Error) -> Self {
        PeanutError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Peanut operations.
pub type Result<T> = std::result::Result<T, PeanutError>;
