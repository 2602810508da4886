//! CLI argument definitions for the Peanut assistant.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Peanut, a small conversational assistant that talks over stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "peanut", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Answer open-ended questions without contacting an external service.
    #[arg(long = "offline")]
    pub offline: bool,

    /// Seed for response selection, for reproducible conversations.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PEANUT_CONFIG env var > ~/.peanut/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PEANUT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                return filter;
            }
        }
        config_level.to_string()
    }

    /// Resolve the response seed.
    ///
    /// Priority: --seed flag > config file value.
    pub fn resolve_seed(&self, config_seed: Option<u64>) -> Option<u64> {
        self.seed.or(config_seed)
    }

    /// Whether external queries are disabled.
    ///
    /// Priority: --offline flag > PEANUT_OFFLINE env var ("1" or "true").
    pub fn resolve_offline(&self) -> bool {
        if self.offline {
            return true;
        }
        std::env::var("PEANUT_OFFLINE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".peanut").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".peanut").join("config.toml");
    }
    PathBuf::from("config.toml")
}
