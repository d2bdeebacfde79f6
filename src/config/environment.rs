//! Deployment environment selection for layered configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Environment whose `{name}.toml` overlay is applied on top of `default.toml`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Environment variable read by [`Environment::from_env`]
    pub const ENV_VAR: &'static str = "NOTIFY_RELAY_APP_ENV";

    /// Read the environment from `NOTIFY_RELAY_APP_ENV`.
    ///
    /// Falls back to `Development` when unset or unparsable.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(format!(
                "'{}' (expected development, test or production)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" Test ".parse::<Environment>().unwrap(), Environment::Test);
    }

    #[test]
    fn test_environment_invalid() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment(msg) if msg.contains("staging")));
    }

    #[test]
    fn test_environment_display_matches_file_stem() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::default().as_str(), "development");
    }
}
