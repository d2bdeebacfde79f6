//! Command handlers for CLI operations
//!
//! Separates command execution from parsing and validation.

pub mod request;
pub mod serve;

pub use request::{CommandReport, RequestCommandHandler, notify_params};
pub use serve::ServeCommandHandler;
