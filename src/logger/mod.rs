//! Logger module
//!
//! Built on `tracing-subscriber` with support for:
//! - Console output on stderr with color control
//! - File output with multiple formats (Full, Compact, JSON)
//! - File rotation (size-based, daily) with retention
//!
//! Stdout is reserved for protocol traffic, so no layer ever writes there.

pub mod config;
pub mod error;
pub(crate) mod rotation;
pub(crate) mod writer;


pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use writer::RotatingFileWriter;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global subscriber with the given configuration
///
/// `RUST_LOG` is not consulted; the level comes from configuration and CLI
/// flags only.
///
/// # Errors
/// Returns an error if the configuration is invalid, the log file cannot be
/// opened, or a global subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let layers = build_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(())
}

/// File layer first, console second: the first layer's ANSI setting leaks
/// into span fields of later ones (tokio-rs/tracing#1817).
fn build_layers(config: &LoggerConfig) -> anyhow::Result<Vec<BoxedLayer>> {
    let mut layers = Vec::with_capacity(2);

    if config.file.enabled {
        let writer = RotatingFileWriter::new(&config.file)?;
        layers.push(file_layer(config.file.format, writer));
    }

    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    Ok(layers)
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stderr().is_terminal();

    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

fn file_layer(format: LogFormat, writer: RotatingFileWriter) -> BoxedLayer {
    match format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    }
}
