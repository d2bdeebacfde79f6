use std::process::ExitCode;

use clap::Parser;
use notify_relay::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = notify_relay::pkg_version(),
        level = %settings.logger.level,
        "Configuration loaded"
    );

    Ok(execute_command(&cli, settings).await?)
}
