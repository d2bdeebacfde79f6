//! Core channel adapter trait and types.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppResult;

/// Successful delivery as reported by a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delivery {
    /// Backend payload worth surfacing to the caller, if any
    pub data: Option<serde_json::Value>,
    /// Human readable confirmation
    pub message: String,
}

impl Delivery {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// One messaging backend behind a uniform send contract
///
/// Uses `async_trait` so adapters can live behind `Arc<dyn ChannelAdapter>`.
/// An implementation performs exactly one delivery call per invocation and
/// never retries.
///
/// # Example Implementation
/// ```ignore
/// #[async_trait]
/// impl ChannelAdapter for PagerAdapter {
///     fn name(&self) -> &'static str {
///         "pager"
///     }
///
///     fn missing_credentials(&self) -> Vec<&'static str> {
///         Vec::new()
///     }
///
///     async fn send_notification(
///         &self,
///         recipient: Option<&str>,
///         message: &str,
///         title: Option<&str>,
///     ) -> AppResult<Delivery> {
///         // one HTTP call here
///     }
/// }
/// ```
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Channel id, e.g. "slack"
    fn name(&self) -> &'static str;

    /// Names of required credential fields that are absent.
    ///
    /// A non-empty list means the channel is "not configured" and the
    /// dispatcher will not call [`ChannelAdapter::send_notification`].
    fn missing_credentials(&self) -> Vec<&'static str>;

    /// Deliver one message
    ///
    /// # Arguments
    /// * `recipient` - Backend-specific target (Slack channel, LINE user id,
    ///   Feishu open_id); `None` lets the adapter use its configured default
    /// * `message` - Body text, never empty
    /// * `title` - Optional heading prepended on its own line
    ///
    /// # Returns
    /// The delivery confirmation, or `AppError::Backend` describing the
    /// transport failure, HTTP status or API error code
    async fn send_notification(
        &self,
        recipient: Option<&str>,
        message: &str,
        title: Option<&str>,
    ) -> AppResult<Delivery>;
}
