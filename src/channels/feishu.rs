//! Feishu / Lark custom app adapter.
//!
//! App credentials are exchanged for a tenant access token, which is cached
//! until shortly before it expires; then one text message is created for the
//! recipient's open_id. Every Feishu response carries `code`, and any
//! non-zero value is an API error even on HTTP 200.
//!
//! Feishu API Reference: https://open.feishu.cn/document/server-docs/im-v1/message/create

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use serde_json::json;
use tokio::sync::Mutex;

use super::adapter::{ChannelAdapter, Delivery};
use super::client::response_json;
use super::format::{compose_text, resolve_recipient};
use crate::config::settings::{FeishuConfig, is_present};
use crate::error::{AppError, AppResult};

pub const CHANNEL_ID: &str = "feishu";

/// Refresh the token this long before Feishu says it expires
const TOKEN_REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(60);

#[derive(Debug, Clone)]
struct TenantToken {
    value: String,
    expires_at: Timestamp,
}

#[derive(Clone)]
pub struct FeishuAdapter {
    config: FeishuConfig,
    client: reqwest::Client,
    token: Arc<Mutex<Option<TenantToken>>>,
}

impl FeishuAdapter {
    pub fn new(config: FeishuConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            token: Arc::new(Mutex::new(None)),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn build_request_body(&self, receive_id: &str, text: &str) -> serde_json::Value {
        json!({
            "receive_id": receive_id,
            "msg_type": "text",
            "content": json!({ "text": text }).to_string(),
        })
    }

    /// Return a valid tenant access token, exchanging credentials if needed
    async fn tenant_token(&self, app_id: &str, app_secret: &str) -> AppResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Timestamp::now() < token.expires_at
        {
            return Ok(token.value.clone());
        }

        let response = self
            .client
            .post(self.api_url("auth/v3/tenant_access_token/internal"))
            .json(&json!({ "app_id": app_id, "app_secret": app_secret }))
            .send()
            .await
            .map_err(|e| AppError::backend(CHANNEL_ID, format!("Feishu auth request failed: {}", e)))?;

        let (status, body) = response_json(CHANNEL_ID, response).await?;
        check_feishu_response(status, &body, "Feishu auth error")?;

        let value = body
            .get("tenant_access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::backend(CHANNEL_ID, "Feishu auth error: no tenant_access_token in response"))?
            .to_string();

        let expire_secs = body.get("expire").and_then(|e| e.as_i64()).unwrap_or(0);
        let lifetime = SignedDuration::from_secs(expire_secs) - TOKEN_REFRESH_MARGIN;
        let expires_at = Timestamp::now()
            .checked_add(lifetime)
            .unwrap_or_else(|_| Timestamp::now());

        tracing::debug!(expire_secs, "Obtained Feishu tenant access token");
        *cached = Some(TenantToken {
            value: value.clone(),
            expires_at,
        });

        Ok(value)
    }
}

/// Map HTTP failures and non-zero `code` values to a backend error
fn check_feishu_response(
    status: reqwest::StatusCode,
    body: &serde_json::Value,
    context: &str,
) -> AppResult<()> {
    let code = body.get("code").and_then(|c| c.as_i64());
    let msg = body.get("msg").and_then(|m| m.as_str()).unwrap_or("unknown error");

    match code {
        Some(0) if status.is_success() => Ok(()),
        Some(code) => Err(AppError::backend(
            CHANNEL_ID,
            format!("{}: {} (code: {})", context, msg, code),
        )),
        None => Err(AppError::backend(
            CHANNEL_ID,
            format!("{}: HTTP {}", context, status),
        )),
    }
}

#[async_trait]
impl ChannelAdapter for FeishuAdapter {
    fn name(&self) -> &'static str {
        CHANNEL_ID
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !is_present(&self.config.app_id) {
            missing.push("app_id");
        }
        if !is_present(&self.config.app_secret) {
            missing.push("app_secret");
        }
        missing
    }

    async fn send_notification(
        &self,
        recipient: Option<&str>,
        message: &str,
        title: Option<&str>,
    ) -> AppResult<Delivery> {
        let (Some(app_id), Some(app_secret)) = (
            self.config.app_id.as_deref().filter(|v| !v.trim().is_empty()),
            self.config.app_secret.as_deref().filter(|v| !v.trim().is_empty()),
        ) else {
            return Err(AppError::ChannelNotConfigured {
                channel: CHANNEL_ID.to_string(),
            });
        };

        let receive_id = resolve_recipient(recipient, self.config.default_user_id.as_deref())
            .ok_or_else(|| AppError::backend(CHANNEL_ID, "No user ID provided for Feishu notification"))?;

        let token = self.tenant_token(app_id, app_secret).await?;
        let text = compose_text(message, title);

        let response = self
            .client
            .post(self.api_url("im/v1/messages?receive_id_type=open_id"))
            .bearer_auth(token)
            .json(&self.build_request_body(receive_id, &text))
            .send()
            .await
            .map_err(|e| AppError::backend(CHANNEL_ID, format!("Feishu request failed: {}", e)))?;

        let (status, body) = response_json(CHANNEL_ID, response).await?;
        check_feishu_response(status, &body, "Feishu API error")?;

        let delivery = Delivery::new("Feishu notification sent successfully");
        Ok(match body.get("data") {
            Some(data) if !data.is_null() => delivery.with_data(data.clone()),
            _ => delivery,
        })
    }
}
