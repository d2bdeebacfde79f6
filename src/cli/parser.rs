//! CLI argument parsing with clap
//!
//! Defines the command-line surface: global flags, the `serve` protocol mode
//! and the one-shot `notify`, `health` and `config` commands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;

/// Relay notifications to Slack, LINE and Feishu
#[derive(Parser, Debug)]
#[command(name = "notify-relay")]
#[command(about = "Relay notifications to Slack, LINE and Feishu")]
#[command(long_about = "
notify-relay fans one notification out to every configured chat backend.
Without a subcommand it speaks a line-delimited JSON-RPC protocol on
stdin/stdout; the other subcommands run a single request and print the
result as JSON.

EXAMPLES:
    # Serve the stdio protocol (default)
    notify-relay

    # Check the configuration without serving
    notify-relay serve --dry-run

    # Send one notification to every enabled channel
    notify-relay notify --message \"Deploy finished\" --title \"CI\"

    # Send to selected channels only, with a 5 second deadline
    notify-relay notify -m \"Disk almost full\" --channel slack --channel line --timeout 5

    # Use a specific configuration file
    notify-relay --config /etc/notify-relay/production.toml health
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load only this TOML file (plus NOTIFY_RELAY_* environment variables)
    /// instead of the layered search. The file must exist and be readable.
    ///
    /// Example: --config /etc/notify-relay/production.toml
    #[arg(short, long, global = true, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{config_dir}/{environment}.toml` layer is loaded.
    ///
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Raises the log level to debug. Logs go to stderr.
    /// Cannot be used with --quiet.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Lowers the log level to error.
    /// Cannot be used with --verbose.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the stdio protocol (default)
    ///
    /// Announces capabilities on stdout, then answers one JSON request per
    /// input line until stdin closes.
    ///
    /// Examples:
    ///   notify-relay serve                 # Serve with defaults
    ///   notify-relay serve --dry-run       # Validate config and print the channel summary
    #[command(alias = "mcp")]
    Serve {
        /// Log level override
        ///
        /// Overrides both the configuration file and the global --verbose/--quiet flags.
        ///
        /// Available levels: error, warn, info, debug, trace
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        ///
        /// Prints the non-sensitive configuration summary instead of serving.
        /// Returns exit code 0 if valid, non-zero if invalid.
        #[arg(long)]
        dry_run: bool,
    },
    /// Send one notification and print the result
    ///
    /// Exits non-zero when no channel succeeded.
    ///
    /// Examples:
    ///   notify-relay notify -m "Build green"
    ///   notify-relay notify -m "Build red" -t "CI" --channel feishu
    Notify {
        /// Notification body
        #[arg(short, long, value_name = "TEXT", value_parser = super::validation::validate_message)]
        message: String,

        /// Optional title, sent on its own line above the message
        #[arg(short, long, value_name = "TEXT")]
        title: Option<String>,

        /// Target channel (slack, line, feishu or multi); repeatable
        ///
        /// Defaults to `relay.default_channels` when omitted.
        #[arg(long = "channel", value_name = "CHANNEL")]
        channels: Vec<String>,

        /// Overall deadline in seconds
        ///
        /// Defaults to `relay.request_timeout_secs`.
        #[arg(long, value_name = "SECS", value_parser = super::validation::validate_timeout)]
        timeout: Option<u64>,
    },
    /// Print relay health as JSON
    Health,
    /// Print the non-sensitive configuration summary as JSON
    Config,
}

/// Environment options
#[derive(ValueEnum, Clone, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Checks clap cannot express on its own
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        if let Some(Commands::Notify { channels, .. }) = &self.command
            && channels.iter().any(|c| c.trim().is_empty())
        {
            return Err("--channel cannot be empty".to_string());
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
