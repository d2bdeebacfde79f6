//! Configuration validation logic
//!
//! Validation only checks shape and ranges. A channel that is enabled but
//! lacks credentials is not a configuration error: it is reported per request
//! as "<channel> not configured".

use crate::channels::{CANONICAL_ORDER, MULTI_ALIAS};
use crate::config::error::ConfigError;
use crate::config::settings::{
    ChannelsConfig, FileSettings, LoggerSettings, RelayConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Valid rotation strategies
const VALID_ROTATION_STRATEGIES: &[&str] = &["size", "daily"];

impl RelayConfig {
    /// Validate relay configuration
    ///
    /// # Validation Rules
    /// - Request and HTTP timeouts must be greater than 0
    /// - Every default channel must be a known channel id or `multi`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "relay.request_timeout_secs",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "relay.http_timeout_secs",
                "HTTP timeout must be greater than 0 seconds.",
            ));
        }

        if let Some(unknown) = self
            .default_channels
            .iter()
            .find(|c| c.as_str() != MULTI_ALIAS && !CANONICAL_ORDER.contains(&c.as_str()))
        {
            return Err(ConfigError::Invalid {
                field: "relay.default_channels".to_string(),
                message: format!(
                    "Unknown channel '{}'. Valid values are: {}, {}",
                    unknown,
                    CANONICAL_ORDER.join(", "),
                    MULTI_ALIAS
                ),
            });
        }

        Ok(())
    }
}

impl ChannelsConfig {
    /// Every API base must be an http(s) URL; webhook URLs too when given
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bases = [
            ("channels.slack.api_base", self.slack.api_base.as_str()),
            ("channels.line.api_base", self.line.api_base.as_str()),
            ("channels.feishu.api_base", self.feishu.api_base.as_str()),
        ];
        for (field, url) in bases {
            check_http_url(field, url)?;
        }

        if let Some(hook) = self.slack.webhook_url.as_deref().filter(|h| !h.trim().is_empty()) {
            check_http_url("channels.slack.webhook_url", hook)?;
        }

        Ok(())
    }
}

fn check_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: field.to_string(),
            message: format!("Invalid URL '{}'. Expected an http:// or https:// URL.", url),
        })
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        if !VALID_ROTATION_STRATEGIES.contains(&self.rotation.strategy.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "logger.file.rotation.strategy".to_string(),
                message: format!(
                    "Invalid rotation strategy '{}'. Valid strategies are: {}",
                    self.rotation.strategy,
                    VALID_ROTATION_STRATEGIES.join(", ")
                ),
            });
        }

        if self.rotation.max_files == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_files",
                "At least one rotated file must be kept.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - Rotation strategy must be one of: size, daily
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first error found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.relay.validate()?;
        self.channels.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::RotationSettings;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::Invalid { field, .. } => field,
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    // ========================================================================
    // RelayConfig validation tests
    // ========================================================================

    #[test]
    fn test_relay_config_valid() {
        assert!(RelayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_relay_config_zero_request_timeout() {
        let config = RelayConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "relay.request_timeout_secs");
    }

    #[test]
    fn test_relay_config_zero_http_timeout() {
        let config = RelayConfig {
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "relay.http_timeout_secs");
    }

    #[test]
    fn test_relay_config_unknown_default_channel() {
        let config = RelayConfig {
            default_channels: vec!["slack".into(), "discord".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("discord"));
    }

    #[test]
    fn test_relay_config_known_default_channels() {
        let config = RelayConfig {
            default_channels: vec!["line".into(), "feishu".into(), "multi".into()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // ChannelsConfig validation tests
    // ========================================================================

    #[test]
    fn test_channels_config_bad_api_base() {
        let mut config = ChannelsConfig::default();
        config.line.api_base = "api.line.me".to_string();
        assert_eq!(field_of(config.validate().unwrap_err()), "channels.line.api_base");
    }

    #[test]
    fn test_channels_config_bad_webhook() {
        let mut config = ChannelsConfig::default();
        config.slack.webhook_url = Some("hooks.slack.com/services/x".to_string());
        assert_eq!(field_of(config.validate().unwrap_err()), "channels.slack.webhook_url");
    }

    #[test]
    fn test_channels_config_blank_webhook_ignored() {
        let mut config = ChannelsConfig::default();
        config.slack.webhook_url = Some(String::new());
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid() {
        assert!(LoggerSettings::default().validate().is_ok());
    }

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_settings_level_case_insensitive() {
        let settings = LoggerSettings {
            level: "WARN".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_settings_empty_path_when_enabled() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.file.path");
    }

    #[test]
    fn test_file_settings_invalid_strategy() {
        let settings = LoggerSettings {
            file: FileSettings {
                rotation: RotationSettings {
                    strategy: "hourly".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.rotation.strategy"
        );
    }

    #[test]
    fn test_file_settings_zero_max_files() {
        let settings = LoggerSettings {
            file: FileSettings {
                rotation: RotationSettings {
                    max_files: 0,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "logger.file.rotation.max_files"
        );
    }

    #[test]
    fn test_settings_validate_reports_first_error() {
        let mut settings = Settings::default();
        settings.relay.request_timeout_secs = 0;
        settings.logger.level = "nope".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "relay.request_timeout_secs");
    }
}
