//! Configuration management module for notify-relay
//!
//! Layered configuration loading with support for:
//! - TOML configuration files (home directory, config directory, working directory)
//! - Environment-specific overlays (development, test, production)
//! - `NOTIFY_RELAY_*` environment variable overrides
//!
//! Settings are loaded once at startup; the resulting snapshot is shared
//! read-only for the lifetime of the process.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, ChannelsConfig, FeishuConfig, LineConfig, LoggerSettings, RelayConfig,
    Settings, SlackConfig,
};
