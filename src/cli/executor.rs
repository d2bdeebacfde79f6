//! Command executor for dispatching CLI commands
//!
//! Main entry point for running a command after parsing and configuration
//! loading.

use std::process::ExitCode;

use serde_json::Value;

use super::handlers::{CommandReport, RequestCommandHandler, ServeCommandHandler, notify_params};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::protocol::methods;

/// Execute a CLI command with the given settings
///
/// `serve` (the default) runs until stdin closes. The one-shot commands
/// print their JSON result to stdout and report failure through the exit
/// code.
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
///
/// # Errors
/// Returns errors from argument validation or the serve handler
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<ExitCode> {
    validate_command_args(cli)?;

    let (method, params) = match &cli.command {
        None => {
            ServeCommandHandler::new(settings).execute(false).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Notify {
            message,
            title,
            channels,
            timeout,
        }) => (
            methods::NOTIFY,
            notify_params(message, title.as_deref(), channels, *timeout),
        ),
        Some(Commands::Health) => (methods::HEALTH, Value::Null),
        Some(Commands::Config) => (methods::CONFIG, Value::Null),
    };

    let report = RequestCommandHandler::new(settings)?
        .execute(method, params)
        .await;
    print_report(&report)?;

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &CommandReport) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(&report.output).map_err(anyhow::Error::from)?;
    println!("{}", rendered);
    Ok(())
}

fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|msg| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason: msg,
    })
}
