//! Multi-channel fan-out.
//!
//! One intent goes to every resolved, enabled channel concurrently; each
//! channel's failure (error or panic) is captured as data so siblings are
//! never aborted. Outcomes are folded in resolved order, not completion
//! order.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;

use super::intent::NotificationIntent;
use super::outcome::{ChannelOutcome, DispatchResult};
use crate::channels::{ChannelEntry, ChannelRegistry};
use crate::config::RelayConfig;
use crate::error::{AppError, AppResult, panic_message};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ChannelRegistry>,
    default_channels: Vec<String>,
    default_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<ChannelRegistry>, relay: &RelayConfig) -> Self {
        Self {
            registry,
            default_channels: relay.default_channels.clone(),
            default_timeout: Duration::from_secs(relay.request_timeout_secs),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn default_channels(&self) -> &[String] {
        &self.default_channels
    }

    /// Send `intent` to its target channels
    ///
    /// # Returns
    /// The aggregated result, including when every channel failed or none was
    /// configured (check `DispatchResult::status`)
    ///
    /// # Errors
    /// - `Validation` when the message is empty; no adapter is called
    /// - `Timeout` when the whole dispatch exceeds its time budget
    pub async fn dispatch(&self, intent: &NotificationIntent) -> AppResult<DispatchResult> {
        if intent.message.trim().is_empty() {
            return Err(AppError::validation("message", "Message is required"));
        }

        let budget = intent.timeout.unwrap_or(self.default_timeout);

        match tokio::time::timeout(budget, self.fan_out(intent)).await {
            Ok(result) => {
                tracing::info!(
                    status = ?result.status,
                    notified = ?result.channels_notified,
                    "Dispatch finished"
                );
                Ok(result)
            }
            Err(_) => {
                tracing::warn!(timeout_secs = budget.as_secs(), "Dispatch timed out");
                Err(AppError::Timeout {
                    seconds: budget.as_secs(),
                })
            }
        }
    }

    async fn fan_out(&self, intent: &NotificationIntent) -> DispatchResult {
        let requested = if intent.target_channels.is_empty() {
            &self.default_channels
        } else {
            &intent.target_channels
        };

        let targets: Vec<&ChannelEntry> = self
            .registry
            .resolve(requested)
            .into_iter()
            .filter(|entry| {
                if !entry.enabled {
                    tracing::debug!(channel = entry.id, "Skipping disabled channel");
                }
                entry.enabled
            })
            .collect();

        tracing::debug!(
            requested = ?requested,
            targets = ?targets.iter().map(|e| e.id).collect::<Vec<_>>(),
            "Resolved dispatch targets"
        );

        let outcomes = join_all(targets.into_iter().map(|entry| deliver(entry, intent))).await;

        DispatchResult::from_outcomes(outcomes)
    }
}

/// Run one adapter and turn whatever happens into an outcome
async fn deliver(entry: &ChannelEntry, intent: &NotificationIntent) -> ChannelOutcome {
    let missing = entry.adapter.missing_credentials();
    if !missing.is_empty() {
        tracing::warn!(channel = entry.id, missing = ?missing, "Channel enabled but not configured");
        return ChannelOutcome::not_configured(entry.id);
    }

    let send = entry.adapter.send_notification(
        entry.default_recipient.as_deref(),
        &intent.message,
        intent.title.as_deref(),
    );

    match AssertUnwindSafe(send).catch_unwind().await {
        Ok(Ok(delivery)) => {
            tracing::info!(channel = entry.id, "Notification delivered");
            ChannelOutcome::success(entry.id, delivery.message, delivery.data)
        }
        Ok(Err(e)) => {
            tracing::warn!(channel = entry.id, error = %e, "Notification failed");
            ChannelOutcome::failure(entry.id, e.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(channel = entry.id, panic = %reason, "Channel adapter panicked");
            ChannelOutcome::failure(entry.id, format!("{} adapter panicked: {}", entry.id, reason))
        }
    }
}
