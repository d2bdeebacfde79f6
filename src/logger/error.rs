//! Logger setup errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    /// Log file or directory could not be created, renamed or removed
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid logger configuration: {0}")]
    Config(String),

    #[error("log rotation failed: {0}")]
    Rotation(String),

    #[error("invalid log format: {0}")]
    Format(String),
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn rotation(message: impl Into<String>) -> Self {
        Self::Rotation(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}
