//! Errors raised while assembling `Settings`

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file (`--config` / `NOTIFY_RELAY_CONFIG_FILE`) is absent
    #[error("Configuration file not found: {0}")]
    MissingFile(String),

    #[error("Failed to parse configuration: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {field} - {message}")]
    Invalid { field: String, message: String },

    /// `NOTIFY_RELAY_APP_ENV` names no known environment
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Conflicting configuration sources: {0}")]
    ConflictingSources(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_file(path: impl Into<String>) -> Self {
        Self::MissingFile(path.into())
    }

    pub fn conflicting_sources(message: impl Into<String>) -> Self {
        Self::ConflictingSources(message.into())
    }
}
