//! notify-relay library
//!
//! Fans one notification out to Slack, LINE and Feishu, reachable through a
//! line-delimited JSON-RPC protocol on stdio or a one-shot CLI.

use shadow_rs::shadow;
shadow!(build);

pub mod channels;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod protocol;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
