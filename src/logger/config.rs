//! Runtime logger configuration, built from `config::settings::LoggerSettings`

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

use crate::logger::error::LoggerError;

/// Resolved logger configuration handed to `init_logger`
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl LoggerConfig {
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self, LoggerError> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        self.parse_level()?;
        self.file.validate()?;

        if !(self.console.enabled || self.file.enabled) {
            return Err(LoggerError::config(
                "Enable console or file output; logging needs at least one sink",
            ));
        }
        Ok(())
    }

    pub fn parse_level(&self) -> Result<Level, LoggerError> {
        Level::from_str(self.level.trim()).map_err(|_| {
            LoggerError::config(format!(
                "Unknown log level '{}' (expected trace, debug, info, warn or error)",
                self.level
            ))
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: Level::INFO.to_string().to_lowercase(),
        }
    }
}

/// Stderr sink. Stdout belongs to the protocol.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colors, applied only when stderr is a terminal
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Keep existing content on startup instead of truncating
    pub append: bool,
    pub format: LogFormat,
    pub rotation: RotationConfig,
}

impl FileConfig {
    /// Does not touch the filesystem; the writer creates missing directories
    pub fn validate(&self) -> Result<(), LoggerError> {
        if !self.enabled {
            return Ok(());
        }
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("logger.file.path is empty but file output is enabled"));
        }
        self.rotation.validate()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/notify-relay.log"),
            append: true,
            format: LogFormat::Json,
            rotation: RotationConfig::default(),
        }
    }
}

/// Event layout in the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("full") {
            Ok(Self::Full)
        } else if s.eq_ignore_ascii_case("compact") {
            Ok(Self::Compact)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(LoggerError::format(format!(
                "Unknown log format '{}' (expected full, compact or json)",
                s
            )))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotationConfig {
    pub strategy: RotationStrategy,
    /// Bytes; consulted by `RotationStrategy::Size` only
    pub max_size: u64,
    /// Rotated files kept next to the active log
    pub max_files: usize,
}

impl RotationConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        match (self.max_size, self.max_files) {
            (0, _) => Err(LoggerError::rotation("logger.file.rotation.max_size must be positive")),
            (_, 0) => Err(LoggerError::rotation("logger.file.rotation.max_files must be positive")),
            _ => Ok(()),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Daily,
            max_size: 10 * 1024 * 1024,
            max_files: 7,
        }
    }
}

/// When the active log file is rotated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationStrategy {
    /// Once the file reaches `max_size` bytes
    Size,
    /// On the first write after local midnight
    #[default]
    Daily,
}

impl FromStr for RotationStrategy {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("size") {
            Ok(Self::Size)
        } else if s.eq_ignore_ascii_case("daily") {
            Ok(Self::Daily)
        } else {
            Err(LoggerError::config(format!(
                "Unknown rotation strategy '{}' (expected size or daily)",
                s
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let config = LoggerConfig {
            level: "DEBUG".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_both_outputs_disabled() {
        let result = LoggerConfig::new(
            ConsoleConfig::new(false, false),
            FileConfig::default(),
            "info".to_string(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rotation_config_validation() {
        let ok = RotationConfig {
            strategy: RotationStrategy::Size,
            max_size: 1024,
            max_files: 5,
        };
        assert!(ok.validate().is_ok());

        let zero_size = RotationConfig { max_size: 0, ..ok.clone() };
        assert!(zero_size.validate().is_err());

        let zero_files = RotationConfig { max_files: 0, ..ok };
        assert!(zero_files.validate().is_err());
    }

    #[test]
    fn test_enabled_file_requires_path() {
        let file = FileConfig {
            enabled: true,
            path: PathBuf::new(),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!("size".parse::<RotationStrategy>().unwrap(), RotationStrategy::Size);
        assert!("weekly".parse::<RotationStrategy>().is_err());
    }
}
