//! Configuration settings structures for notify-relay
//!
//! Everything here can be loaded from TOML files and `NOTIFY_RELAY_*`
//! environment variables. Credential fields are optional strings; an empty
//! or blank value counts as absent.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig, RotationStrategy};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "notify-relay".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_channels() -> Vec<String> {
    vec![crate::channels::MULTI_ALIAS.to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_http_timeout() -> u64 {
    10
}

fn default_slack_channel() -> Option<String> {
    Some("#general".to_string())
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_feishu_api_base() -> String {
    "https://open.feishu.cn/open-apis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/notify-relay.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation_strategy() -> String {
    "daily".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    7
}

/// True when an optional credential carries a non-blank value.
pub fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Relay Configuration
// ============================================================================

/// Dispatch behaviour shared by every channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Channels used when a request names none. `multi` expands to every
    /// registered channel.
    #[serde(default = "default_channels")]
    pub default_channels: Vec<String>,

    /// Upper bound for one whole dispatch, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-request timeout of the shared HTTP client, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            default_channels: default_channels(),
            request_timeout_secs: default_request_timeout(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

// ============================================================================
// Channel Configuration
// ============================================================================

/// Slack: bot token (chat.postMessage) takes precedence over an incoming webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Channel posted to when the request names no recipient
    #[serde(default = "default_slack_channel")]
    pub default_channel: Option<String>,

    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: None,
            webhook_url: None,
            default_channel: default_slack_channel(),
            api_base: default_slack_api_base(),
        }
    }
}

/// LINE Messaging API push credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub channel_access_token: Option<String>,

    #[serde(default)]
    pub default_user_id: Option<String>,

    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_access_token: None,
            default_user_id: None,
            api_base: default_line_api_base(),
        }
    }
}

/// Feishu / Lark custom app credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeishuConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub app_id: Option<String>,

    #[serde(default)]
    pub app_secret: Option<String>,

    /// open_id of the user messaged by default
    #[serde(default)]
    pub default_user_id: Option<String>,

    #[serde(default = "default_feishu_api_base")]
    pub api_base: String,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            app_id: None,
            app_secret: None,
            default_user_id: None,
            api_base: default_feishu_api_base(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub line: LineConfig,

    #[serde(default)]
    pub feishu: FeishuConfig,
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// ANSI colors, only honoured when stderr is a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// "size" or "daily"
    #[serde(default = "default_rotation_strategy")]
    pub strategy: String,

    /// Bytes written before a size rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Rotated files kept on disk
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            strategy: default_rotation_strategy(),
            max_size: default_max_size(),
            max_files: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// "full", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime `LoggerConfig`
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;
        let strategy = self
            .rotation
            .strategy
            .parse::<RotationStrategy>()
            .map_err(|e| ConfigError::validation("logger.file.rotation.strategy", e.to_string()))?;

        Ok(FileConfig {
            enabled: self.enabled,
            path: PathBuf::from(self.path),
            append: self.append,
            format,
            rotation: RotationConfig {
                strategy,
                max_size: self.rotation.max_size,
                max_files: self.rotation.max_files,
            },
        })
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete relay settings, loaded once at startup and shared read-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub channels: ChannelsConfig,

    #[serde(default)]
    pub logger: LoggerSettings,
}
