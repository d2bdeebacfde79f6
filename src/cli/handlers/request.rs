//! One-shot request handler for the `notify`, `health` and `config` commands
//!
//! Builds the same request a protocol peer would send and routes it through
//! [`ProtocolHandler::route`].

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::error::AppResult;
use crate::protocol::{ProtocolHandler, RpcError};

/// What a one-shot command printed and whether it counts as success
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub output: Value,
    pub success: bool,
}

pub struct RequestCommandHandler {
    handler: ProtocolHandler,
}

impl RequestCommandHandler {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(settings: Settings) -> AppResult<Self> {
        Ok(Self::with_handler(ProtocolHandler::from_settings(Arc::new(
            settings,
        ))?))
    }

    pub fn with_handler(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Route one request; failures are reported, never propagated
    ///
    /// A result whose `status` is `"error"` is printed like any other result
    /// but marks the report as failed.
    pub async fn execute(&self, method: &str, params: Value) -> CommandReport {
        match self.handler.route(method, params).await {
            Ok(output) => {
                let success = output.get("status").and_then(Value::as_str) != Some("error");
                CommandReport { output, success }
            }
            Err(e) => {
                tracing::error!(method = %method, error = %e, "Command failed");
                CommandReport {
                    output: json!({ "error": RpcError::from(&e) }),
                    success: false,
                }
            }
        }
    }
}

/// `notify` params from CLI flags; absent flags are left out so the relay
/// defaults apply
pub fn notify_params(
    message: &str,
    title: Option<&str>,
    channels: &[String],
    timeout_secs: Option<u64>,
) -> Value {
    let mut params = Map::new();
    params.insert("message".to_string(), json!(message));
    if let Some(title) = title {
        params.insert("title".to_string(), json!(title));
    }
    if !channels.is_empty() {
        params.insert("channels".to_string(), json!(channels));
    }
    if let Some(secs) = timeout_secs {
        params.insert("timeout_secs".to_string(), json!(secs));
    }
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChannelAdapter, ChannelRegistry, Delivery};
    use crate::dispatch::Dispatcher;
    use crate::error::AppError;
    use async_trait::async_trait;

    struct FixedAdapter {
        ok: bool,
    }

    #[async_trait]
    impl ChannelAdapter for FixedAdapter {
        fn name(&self) -> &'static str {
            "slack"
        }

        fn missing_credentials(&self) -> Vec<&'static str> {
            Vec::new()
        }

        async fn send_notification(
            &self,
            _recipient: Option<&str>,
            _message: &str,
            _title: Option<&str>,
        ) -> AppResult<Delivery> {
            if self.ok {
                Ok(Delivery::new("Slack message sent successfully"))
            } else {
                Err(AppError::backend("slack", "Slack API error: channel_not_found"))
            }
        }
    }

    fn command_handler(ok: bool) -> RequestCommandHandler {
        let mut registry = ChannelRegistry::new();
        registry.register(true, None, Arc::new(FixedAdapter { ok }));
        let settings = Arc::new(Settings::default());
        let dispatcher = Dispatcher::new(Arc::new(registry), &settings.relay);
        RequestCommandHandler::with_handler(ProtocolHandler::new(settings, dispatcher))
    }

    #[test]
    fn test_notify_params_omit_absent_flags() {
        let params = notify_params("hi", None, &[], None);
        assert_eq!(params, json!({"message": "hi"}));

        let params = notify_params("hi", Some("T"), &["line".to_string()], Some(4));
        assert_eq!(
            params,
            json!({"message": "hi", "title": "T", "channels": ["line"], "timeout_secs": 4})
        );
    }

    #[tokio::test]
    async fn test_successful_notify_report() {
        let report = command_handler(true)
            .execute("notify", notify_params("hi", None, &[], None))
            .await;
        assert!(report.success);
        assert_eq!(report.output["channels_notified"], json!(["slack"]));
    }

    #[tokio::test]
    async fn test_failed_channels_mark_report_failed() {
        let report = command_handler(false)
            .execute("notify", notify_params("hi", None, &[], None))
            .await;
        assert!(!report.success);
        assert_eq!(report.output["status"], "error");
        assert_eq!(
            report.output["details"]["slack"]["error"],
            "Slack API error: channel_not_found"
        );
    }

    #[tokio::test]
    async fn test_rpc_error_is_printed_not_propagated() {
        let report = command_handler(true)
            .execute("notify", notify_params("hi", None, &["pager".to_string()], None))
            .await;
        assert!(!report.success);
        assert_eq!(report.output["error"]["code"], -32000);
        assert_eq!(report.output["error"]["data"]["error"], "No channels configured");
    }

    #[tokio::test]
    async fn test_health_report() {
        let report = command_handler(true).execute("health", Value::Null).await;
        assert!(report.success);
        assert_eq!(report.output["status"], "healthy");
    }
}
