use thiserror::Error;

/// JSON-RPC error codes used on the wire.
pub mod codes {
    /// Inbound line is not valid JSON
    pub const PARSE_ERROR: i64 = -32700;
    /// JSON is valid but not a usable request envelope
    pub const INVALID_REQUEST: i64 = -32600;
    /// Unknown method name
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Params missing or malformed
    pub const INVALID_PARAMS: i64 = -32602;
    /// Unexpected failure, timeouts and caught panics
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Application-level configuration error
    pub const CONFIGURATION_ERROR: i64 = -32000;
}

/// Application-wide error type.
///
/// Per-channel delivery failures are normally folded into a
/// `DispatchResult` as data; they only surface as `AppError` values between
/// an adapter and the dispatcher. Everything else propagates to the
/// protocol shell, which maps it to a JSON-RPC error with [`AppError::rpc_code`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Request params could not be decoded
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    /// Channel is enabled but required credentials are missing
    #[error("{channel} not configured")]
    ChannelNotConfigured { channel: String },

    /// Backend call failed (transport, HTTP status or API error code)
    #[error("{message}")]
    Backend { channel: String, message: String },

    /// Inbound line could not be decoded
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Envelope is structurally wrong (e.g. unsupported protocol version)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Method name is not routed by the shell
    #[error("Method {method} not supported")]
    MethodNotFound { method: String },

    /// Nothing in the resolved target set was enabled and configured
    #[error("No channels configured")]
    NoChannelsConfigured {
        /// Serialized dispatch result, kept so callers still see the details
        result: Option<serde_json::Value>,
    },

    /// Whole-dispatch timeout expired
    #[error("Dispatch timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a backend failure on `channel`.
    pub fn backend(channel: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Backend {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// JSON-RPC error code for this error.
    ///
    /// # Code Mapping
    /// - Parse → -32700
    /// - InvalidRequest → -32600
    /// - MethodNotFound → -32601
    /// - Validation, InvalidParams → -32602
    /// - ChannelNotConfigured, NoChannelsConfigured, Configuration → -32000
    /// - Backend, Timeout, Internal → -32603
    pub fn rpc_code(&self) -> i64 {
        match self {
            AppError::Parse { .. } => codes::PARSE_ERROR,
            AppError::InvalidRequest { .. } => codes::INVALID_REQUEST,
            AppError::MethodNotFound { .. } => codes::METHOD_NOT_FOUND,
            AppError::Validation { .. } | AppError::InvalidParams { .. } => codes::INVALID_PARAMS,
            AppError::ChannelNotConfigured { .. }
            | AppError::NoChannelsConfigured { .. }
            | AppError::Configuration { .. } => codes::CONFIGURATION_ERROR,
            AppError::Backend { .. } | AppError::Timeout { .. } | AppError::Internal { .. } => {
                codes::INTERNAL_ERROR
            }
        }
    }

    /// Extra payload attached to the wire error, if any.
    pub fn rpc_data(&self) -> Option<serde_json::Value> {
        match self {
            AppError::NoChannelsConfigured { result } => result.clone(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = match &error {
            crate::config::error::ConfigError::Invalid { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
