//! Method routing shared by the stdio server and the CLI.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use jiff::Timestamp;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::envelope::{Inbound, RpcRequest, RpcResponse, capabilities};
use crate::channels::{ChannelRegistry, build_http_client};
use crate::config::Settings;
use crate::dispatch::{Dispatcher, NotificationIntent};
use crate::error::{AppError, AppResult, panic_message};

/// Method names understood by [`ProtocolHandler::route`]
pub mod methods {
    pub const NOTIFY: &str = "notify";
    pub const HEALTH: &str = "health";
    pub const CONFIG: &str = "config";
    pub const INITIALIZE: &str = "initialize";
}

/// `notify` params
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotifyParams {
    pub message: Option<String>,
    pub title: Option<String>,
    pub channels: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl NotifyParams {
    pub fn into_intent(self) -> AppResult<NotificationIntent> {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::validation("message", "Message is required"))?;

        let timeout = match self.timeout_secs {
            Some(0) => {
                return Err(AppError::InvalidParams {
                    message: "timeout_secs must be greater than 0".to_string(),
                });
            }
            other => other.map(Duration::from_secs),
        };

        Ok(NotificationIntent::new(message)
            .with_title(self.title)
            .with_channels(self.channels.unwrap_or_default())
            .with_timeout(timeout))
    }
}

/// Routes decoded requests to the dispatcher or the read-only handlers
pub struct ProtocolHandler {
    settings: Arc<Settings>,
    dispatcher: Dispatcher,
    started: Instant,
}

impl ProtocolHandler {
    pub fn new(settings: Arc<Settings>, dispatcher: Dispatcher) -> Self {
        Self {
            settings,
            dispatcher,
            started: Instant::now(),
        }
    }

    /// Wire the real adapters from configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn from_settings(settings: Arc<Settings>) -> AppResult<Self> {
        let client = build_http_client(settings.relay.http_timeout_secs)?;
        let registry = Arc::new(ChannelRegistry::from_settings(&settings.channels, client));
        let dispatcher = Dispatcher::new(registry, &settings.relay);
        Ok(Self::new(settings, dispatcher))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Process one inbound line; `None` means nothing is written back
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        match Inbound::decode(line) {
            Inbound::Request(request) => self.handle_request(request).await,
            Inbound::PeerMessage { id } => {
                tracing::debug!(id = ?id, "Ignoring message without method");
                None
            }
            Inbound::Invalid { id, error } => {
                tracing::warn!(error = %error, "Rejected inbound message");
                Some(RpcResponse::failure(id, &error))
            }
        }
    }

    /// Route a request, catching panics so the caller keeps running
    pub async fn handle_request(&self, request: RpcRequest) -> Option<RpcResponse> {
        let RpcRequest { method, params, id } = request;
        tracing::debug!(method = %method, id = ?id, "Handling request");

        let outcome = AssertUnwindSafe(self.route(&method, params))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                let reason = panic_message(payload.as_ref());
                tracing::error!(method = %method, panic = %reason, "Request handler panicked");
                Err(AppError::Internal {
                    source: anyhow::anyhow!("panic while handling {}: {}", method, reason),
                })
            });

        if let Err(ref e) = outcome {
            tracing::warn!(method = %method, code = e.rpc_code(), error = %e, "Request failed");
        }

        let id = id?;
        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(Some(id), &error),
        })
    }

    /// Run one method and return its result payload
    pub async fn route(&self, method: &str, params: Value) -> AppResult<Value> {
        match method {
            methods::NOTIFY => self.notify(params).await,
            methods::HEALTH => Ok(self.health()),
            methods::CONFIG => Ok(self.config_summary()),
            methods::INITIALIZE => Ok(self.initialize()),
            other => Err(AppError::MethodNotFound {
                method: other.to_string(),
            }),
        }
    }

    async fn notify(&self, params: Value) -> AppResult<Value> {
        let params: NotifyParams = if params.is_null() {
            NotifyParams::default()
        } else {
            serde_json::from_value(params).map_err(|e| AppError::InvalidParams {
                message: e.to_string(),
            })?
        };

        let intent = params.into_intent()?;
        let result = self.dispatcher.dispatch(&intent).await?;
        let value = serde_json::to_value(&result).map_err(anyhow::Error::from)?;

        if result.is_unconfigured() {
            return Err(AppError::NoChannelsConfigured {
                result: Some(value),
            });
        }

        Ok(value)
    }

    fn health(&self) -> Value {
        let channels: Map<String, Value> = self
            .dispatcher
            .registry()
            .iter()
            .map(|entry| (entry.id.to_string(), Value::Bool(entry.enabled)))
            .collect();

        json!({
            "status": "healthy",
            "timestamp": Timestamp::now().to_string(),
            "uptime_seconds": self.started.elapsed().as_secs(),
            "version": self.settings.application.version,
            "channels": channels,
        })
    }

    /// Non-sensitive projection: never includes tokens, secrets or webhook URLs
    fn config_summary(&self) -> Value {
        let channels: Map<String, Value> = self
            .dispatcher
            .registry()
            .iter()
            .map(|entry| {
                (
                    entry.id.to_string(),
                    json!({ "enabled": entry.enabled, "configured": entry.is_configured() }),
                )
            })
            .collect();

        json!({
            "channels": channels,
            "default_channels": self.dispatcher.default_channels(),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "initialized": true,
            "capabilities": capabilities(),
            "serverInfo": {
                "name": self.settings.application.name,
                "version": self.settings.application.version,
            },
        })
    }
}
