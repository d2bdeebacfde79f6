//! Slack channel adapter.
//!
//! Two delivery modes, chosen by the credentials present:
//! - bot token: `POST {api_base}/chat.postMessage` with bearer auth; the API
//!   answers HTTP 200 with `ok: false` on failure
//! - incoming webhook: `POST {webhook_url}` with `{text, channel}`
//!
//! Slack API Reference: https://api.slack.com/methods/chat.postMessage

use async_trait::async_trait;
use serde_json::json;

use super::adapter::{ChannelAdapter, Delivery};
use super::client::response_json;
use super::format::{compose_text, resolve_recipient};
use crate::config::settings::{SlackConfig, is_present};
use crate::error::{AppError, AppResult};

pub const CHANNEL_ID: &str = "slack";

#[derive(Clone)]
pub struct SlackAdapter {
    config: SlackConfig,
    client: reqwest::Client,
}

/// Which Slack API a send goes through
#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    BotToken(&'a str),
    Webhook(&'a str),
}

impl SlackAdapter {
    pub fn new(config: SlackConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn mode(&self) -> Option<Mode<'_>> {
        if is_present(&self.config.bot_token) {
            self.config.bot_token.as_deref().map(Mode::BotToken)
        } else if is_present(&self.config.webhook_url) {
            self.config.webhook_url.as_deref().map(Mode::Webhook)
        } else {
            None
        }
    }

    fn build_request_body(&self, channel: Option<&str>, text: &str, bot_mode: bool) -> serde_json::Value {
        let mut body = json!({ "text": text });
        if let Some(channel) = channel {
            body["channel"] = json!(channel);
        }
        if bot_mode {
            body["mrkdwn"] = json!(true);
        }
        body
    }

    async fn post_message(&self, token: &str, channel: Option<&str>, text: &str) -> AppResult<Delivery> {
        let channel = channel.ok_or_else(|| {
            AppError::backend(CHANNEL_ID, "No Slack channel provided for notification")
        })?;
        let url = format!("{}/chat.postMessage", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&self.build_request_body(Some(channel), text, true))
            .send()
            .await
            .map_err(|e| AppError::backend(CHANNEL_ID, format!("Slack request failed: {}", e)))?;

        let (status, body) = response_json(CHANNEL_ID, response).await?;
        if !status.is_success() {
            return Err(AppError::backend(
                CHANNEL_ID,
                format!("Slack API error: HTTP {}", status),
            ));
        }

        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let reason = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown_error");
            return Err(AppError::backend(
                CHANNEL_ID,
                format!("Slack API error: {}", reason),
            ));
        }

        let data = json!({
            "channel": body.get("channel").cloned().unwrap_or(json!(channel)),
            "ts": body.get("ts").cloned().unwrap_or(serde_json::Value::Null),
        });

        Ok(Delivery::new("Slack message sent successfully").with_data(data))
    }

    async fn post_webhook(&self, url: &str, channel: Option<&str>, text: &str) -> AppResult<Delivery> {
        let response = self
            .client
            .post(url)
            .json(&self.build_request_body(channel, text, false))
            .send()
            .await
            .map_err(|e| AppError::backend(CHANNEL_ID, format!("Slack webhook request failed: {}", e)))?;

        let (status, body) = response_json(CHANNEL_ID, response).await?;
        if !status.is_success() {
            let detail = body.as_str().map(str::to_string).unwrap_or_else(|| body.to_string());
            return Err(AppError::backend(
                CHANNEL_ID,
                format!("Slack webhook error: HTTP {} {}", status, detail),
            ));
        }

        Ok(Delivery::new("Slack message sent successfully"))
    }
}

#[async_trait]
impl ChannelAdapter for SlackAdapter {
    fn name(&self) -> &'static str {
        CHANNEL_ID
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        if self.mode().is_some() {
            Vec::new()
        } else {
            vec!["bot_token", "webhook_url"]
        }
    }

    async fn send_notification(
        &self,
        recipient: Option<&str>,
        message: &str,
        title: Option<&str>,
    ) -> AppResult<Delivery> {
        let text = compose_text(message, title);
        let channel = resolve_recipient(recipient, self.config.default_channel.as_deref());

        match self.mode() {
            Some(Mode::BotToken(token)) => self.post_message(token, channel, &text).await,
            Some(Mode::Webhook(url)) => self.post_webhook(url, channel, &text).await,
            None => Err(AppError::ChannelNotConfigured {
                channel: CHANNEL_ID.to_string(),
            }),
        }
    }
}
