//! Serve command handler
//!
//! Runs the stdio protocol server, or checks the configuration in dry-run mode.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppResult;
use crate::protocol::{ProtocolHandler, StdioServer, methods};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Arguments
    /// * `dry_run` - If true, validates configuration and prints the summary
    ///   instead of serving
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - HTTP client construction errors
    /// - Output write errors while serving
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only().await;
        }

        let handler = self.build_handler()?;
        tracing::info!(
            enabled = ?handler.dispatcher().registry().enabled_ids(),
            "Starting stdio protocol server"
        );

        StdioServer::stdio(Arc::new(handler)).run().await?;
        Ok(())
    }

    /// Validate configuration and print the non-sensitive summary
    pub async fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        let summary = self
            .build_handler()?
            .route(methods::CONFIG, serde_json::Value::Null)
            .await?;

        eprintln!("✓ Configuration is valid");
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).map_err(anyhow::Error::from)?
        );
        Ok(())
    }

    fn build_handler(&self) -> AppResult<ProtocolHandler> {
        ProtocolHandler::from_settings(Arc::new(self.config.clone()))
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
