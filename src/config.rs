use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineOptions;
use crate::thread::{ClassifierPolicy, DEFAULT_WINDOW_SECS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Thread detection
    pub window_seconds: u64,
    pub policy: ClassifierPolicy,

    // Data directories
    pub raw_data_dir: PathBuf,
    pub processed_data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Thread detection
            window_seconds: parse_env_u64("THREAD_WINDOW_SECS", DEFAULT_WINDOW_SECS)?,
            policy: parse_policy(&env_or_default("THREAD_POLICY", "window-only"))?,

            // Data directories
            raw_data_dir: PathBuf::from(env_or_default("RAW_DATA_DIR", "../data/raw")),
            processed_data_dir: PathBuf::from(env_or_default(
                "PROCESSED_DATA_DIR",
                "../data/processed",
            )),
        })
    }

    /// Defaults without consulting the environment.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECS,
            policy: ClassifierPolicy::WindowOnly,
            raw_data_dir: PathBuf::from("data/raw"),
            processed_data_dir: PathBuf::from("data/processed"),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "THREAD_WINDOW_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Engine options derived from this configuration.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            window_seconds: self.window_seconds,
            policy: self.policy,
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

/// Parse a classifier policy name.
///
/// # Errors
///
/// Returns an error for names other than `window-only` or `heuristic`.
pub fn parse_policy(value: &str) -> Result<ClassifierPolicy, ConfigError> {
    ClassifierPolicy::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        name: "THREAD_POLICY".to_string(),
        message: format!("must be 'window-only' or 'heuristic', got '{value}'"),
    })
}
