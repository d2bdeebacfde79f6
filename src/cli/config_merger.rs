//! Configuration merger for CLI arguments and config files
//!
//! Loads file/environment configuration and applies CLI overrides on top,
//! CLI arguments having the highest priority.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

/// Applies CLI argument overrides to file-based configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI flags ask for
    ///
    /// `--config` switches the loader to single-file mode and `--env`
    /// replaces the environment read from `NOTIFY_RELAY_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = &cli.env {
            loader = loader.with_environment(env.clone().into());
        }

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// # Arguments
    /// * `cli` - Parsed CLI arguments
    ///
    /// # Returns
    /// A new, validated Settings instance with CLI overrides applied
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        Self::apply_global_overrides(&mut config, cli);

        if let Some(ref command) = cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve { log_level, .. } => {
                // Takes precedence over --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.clone().into();
                }
            }
            Commands::Notify { .. } | Commands::Health | Commands::Config => {}
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::tests::{EnvGuard, TEST_MUTEX};
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_merge_verbose_flag() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(["notify-relay", "--verbose"]).unwrap();

        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merged.logger.level, "debug");
    }

    #[test]
    fn test_merge_quiet_flag() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(["notify-relay", "--quiet", "health"]).unwrap();

        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn test_serve_log_level_beats_global_flags() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli =
            Cli::try_parse_from(["notify-relay", "--verbose", "serve", "--log-level", "trace"]).unwrap();

        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merged.logger.level, "trace");
    }

    #[test]
    fn test_merge_rejects_invalid_base() {
        let mut base = Settings::default();
        base.relay.request_timeout_secs = 0;
        let merger = ConfigurationMerger::new(base);
        let cli = Cli::try_parse_from(["notify-relay"]).unwrap();

        assert!(merger.merge_cli_args(&cli).is_err());
    }

    #[test]
    fn test_from_cli_uses_config_file() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut guard = EnvGuard::new();
        guard.clear_relay_vars();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[relay]\ndefault_channels = [\"slack\"]\nrequest_timeout_secs = 12\n\n[channels.slack]\nenabled = true\nwebhook_url = \"https://hooks.example.com/T\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["notify-relay", "--config", path, "config"]).unwrap();
        let settings = ConfigurationMerger::from_cli(&cli)
            .unwrap()
            .merge_cli_args(&cli)
            .unwrap();

        assert_eq!(settings.relay.default_channels, vec!["slack"]);
        assert_eq!(settings.relay.request_timeout_secs, 12);
        assert!(settings.channels.slack.enabled);
    }
}
