//! Configuration management for the voice concierge
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files under `config/`
//! - Environment variables (VOICE_CONCIERGE prefix, `__` separator)
//!
//! Every field has a default, so an empty configuration is a valid one.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, AgentSettings, ContinuitySettings, NavigationSettings,
    ObservabilityConfig, RingSettings, SessionSettings, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
