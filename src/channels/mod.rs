//! Messaging backends behind one adapter contract.
//!
//! The core trait `ChannelAdapter` is implemented once per backend; the
//! `ChannelRegistry` builds them from configuration at startup.

mod adapter;
mod client;
pub mod feishu;
mod format;
pub mod line;
mod registry;
pub mod slack;

pub use adapter::{ChannelAdapter, Delivery};
pub use client::build_http_client;
pub use feishu::FeishuAdapter;
pub use format::compose_text;
pub use line::LineAdapter;
pub use registry::{ChannelEntry, ChannelRegistry};
pub use slack::SlackAdapter;

/// Iteration and `multi` expansion order
pub const CANONICAL_ORDER: &[&str] = &[slack::CHANNEL_ID, line::CHANNEL_ID, feishu::CHANNEL_ID];

/// Pseudo channel id standing for every registered channel
pub const MULTI_ALIAS: &str = "multi";
