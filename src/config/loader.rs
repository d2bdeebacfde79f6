//! Configuration loader for notify-relay
//!
//! `ConfigLoader` stacks every configuration source with proper precedence
//! and deserializes the result into `Settings`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use config::builder::{ConfigBuilder, DefaultState};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "NOTIFY_RELAY_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "NOTIFY_RELAY_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Per-user configuration file, relative to `$HOME`
const HOME_CONFIG_FILE: &str = ".notify-relay/config.toml";

/// Per-project configuration file, relative to the working directory
const WORKDIR_CONFIG_FILE: &str = ".notify-relay.toml";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "NOTIFY_RELAY";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. `$HOME/.notify-relay/config.toml`
/// 3. `{config_dir}/default.toml`, `{config_dir}/{environment}.toml`,
///    `{config_dir}/local.toml`
/// 4. `./.notify-relay.toml`
/// 5. `NOTIFY_RELAY_*` environment variables
///
/// Every file is optional. In single-file mode only that file (required)
/// and the environment variables are read.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
    home_dir: Option<PathBuf>,
    working_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment
    ///
    /// Reads `NOTIFY_RELAY_CONFIG_DIR`, `NOTIFY_RELAY_CONFIG_FILE`,
    /// `NOTIFY_RELAY_APP_ENV` and `HOME`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `NOTIFY_RELAY_CONFIG_DIR` and
    /// `NOTIFY_RELAY_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir_override = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && dir_override.is_some() {
            return Err(ConfigError::conflicting_sources(
                "NOTIFY_RELAY_CONFIG_DIR and NOTIFY_RELAY_CONFIG_FILE cannot both be set. \
                 Use NOTIFY_RELAY_CONFIG_DIR for layered configuration or \
                 NOTIFY_RELAY_CONFIG_FILE for a single configuration file.",
            ));
        }

        let config_dir = dir_override
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));

        Ok(Self {
            config_dir,
            config_file,
            environment: AppEnvironment::from_env(),
            home_dir: std::env::var_os("HOME").map(PathBuf::from),
            working_dir: PathBuf::from("."),
        })
    }

    /// Switch to single-file mode
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment read from `NOTIFY_RELAY_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Override where the home and working-directory files are looked up
    pub fn with_search_roots(mut self, home_dir: Option<PathBuf>, working_dir: PathBuf) -> Self {
        self.home_dir = home_dir;
        self.working_dir = working_dir;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the single configuration file is missing
    /// - a source cannot be parsed or deserialized
    /// - the merged settings fail validation
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::Malformed(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        tracing::debug!(
            environment = %self.environment,
            single_file = self.config_file.is_some(),
            "Configuration loaded"
        );

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            Self::add_file_source(builder, config_file, true)?
        } else {
            self.build_layered_config(builder)?
        };

        // NOTIFY_RELAY_CHANNELS__SLACK__BOT_TOKEN -> channels.slack.bot_token
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = builder;

        if let Some(ref home) = self.home_dir {
            builder = Self::add_file_source(builder, &home.join(HOME_CONFIG_FILE), false)?;
        }

        let layered = [
            "default.toml".to_string(),
            format!("{}.toml", self.environment.as_str()),
            "local.toml".to_string(),
        ];
        for name in layered {
            builder = Self::add_file_source(builder, &self.config_dir.join(name), false)?;
        }

        builder = Self::add_file_source(builder, &self.working_dir.join(WORKDIR_CONFIG_FILE), false)?;

        Ok(builder)
    }

    /// Add a TOML file source, failing early if a required file is missing
    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.is_file() {
            return Err(ConfigError::missing_file(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let Some(path_str) = path.to_str() else {
            return Err(ConfigError::Malformed(format!(
                "Configuration path is not valid UTF-8: {}",
                path.display()
            )));
        };

        Ok(builder.add_source(File::new(path_str, FileFormat::Toml).required(required)))
    }

    /// Environment variables with prefix `NOTIFY_RELAY_` map to configuration
    /// keys; `__` separates nested keys. Lists are comma separated.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("relay.default_channels")
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}
