//! LINE Messaging API adapter.
//!
//! Sends one text push message per notification.
//!
//! LINE API Reference: https://developers.line.biz/en/reference/messaging-api/#send-push-message

use async_trait::async_trait;
use serde_json::json;

use super::adapter::{ChannelAdapter, Delivery};
use super::client::response_json;
use super::format::{compose_text, resolve_recipient, truncate_chars};
use crate::config::settings::{LineConfig, is_present};
use crate::error::{AppError, AppResult};

pub const CHANNEL_ID: &str = "line";

/// Longest text message LINE accepts, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Clone)]
pub struct LineAdapter {
    config: LineConfig,
    client: reqwest::Client,
}

impl LineAdapter {
    pub fn new(config: LineConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn build_request_body(&self, to: &str, text: &str) -> serde_json::Value {
        json!({
            "to": to,
            "messages": [{
                "type": "text",
                "text": truncate_chars(text, MAX_TEXT_CHARS),
            }],
        })
    }
}

#[async_trait]
impl ChannelAdapter for LineAdapter {
    fn name(&self) -> &'static str {
        CHANNEL_ID
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        if is_present(&self.config.channel_access_token) {
            Vec::new()
        } else {
            vec!["channel_access_token"]
        }
    }

    async fn send_notification(
        &self,
        recipient: Option<&str>,
        message: &str,
        title: Option<&str>,
    ) -> AppResult<Delivery> {
        let token = self
            .config
            .channel_access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::ChannelNotConfigured {
                channel: CHANNEL_ID.to_string(),
            })?;

        let to = resolve_recipient(recipient, self.config.default_user_id.as_deref())
            .ok_or_else(|| AppError::backend(CHANNEL_ID, "No user ID provided for LINE notification"))?;

        let text = compose_text(message, title);
        let url = format!("{}/v2/bot/message/push", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&self.build_request_body(to, &text))
            .send()
            .await
            .map_err(|e| AppError::backend(CHANNEL_ID, format!("LINE request failed: {}", e)))?;

        let (status, body) = response_json(CHANNEL_ID, response).await?;
        if !status.is_success() {
            let detail = body
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            return Err(AppError::backend(
                CHANNEL_ID,
                format!("LINE API error: HTTP {} {}", status, detail),
            ));
        }

        let delivery = Delivery::new("LINE message sent successfully");
        let has_payload = body.as_object().is_some_and(|m| !m.is_empty());
        Ok(if has_payload {
            delivery.with_data(body)
        } else {
            delivery
        })
    }
}
