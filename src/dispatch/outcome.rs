//! Per-channel outcomes and the aggregated dispatch result

use jiff::Timestamp;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

pub const NO_CHANNELS_CONFIGURED: &str = "No channels configured";
pub const ALL_CHANNELS_FAILED: &str = "All channels failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result of one adapter invocation, or of the "not configured" check
/// that replaced it
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome {
    pub channel: String,
    pub status: Status,
    /// Confirmation on success, failure text on error
    pub message: String,
    pub raw_response: Option<serde_json::Value>,
    /// False when the adapter was skipped for missing credentials
    pub attempted: bool,
}

impl ChannelOutcome {
    pub fn success(
        channel: impl Into<String>,
        message: impl Into<String>,
        raw_response: Option<serde_json::Value>,
    ) -> Self {
        Self {
            channel: channel.into(),
            status: Status::Success,
            message: message.into(),
            raw_response,
            attempted: true,
        }
    }

    pub fn failure(channel: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            status: Status::Error,
            message: error.into(),
            raw_response: None,
            attempted: true,
        }
    }

    pub fn not_configured(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        let message = format!("{} not configured", channel);
        Self {
            attempted: false,
            ..Self::failure(channel, message)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Wire shape: `{status, message}` / `{status, error}` plus `response` when
/// the backend returned a payload
impl Serialize for ChannelOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.raw_response.is_some());
        let mut state = serializer.serialize_struct("ChannelOutcome", len)?;
        state.serialize_field("status", &self.status)?;
        match self.status {
            Status::Success => state.serialize_field("message", &self.message)?,
            Status::Error => state.serialize_field("error", &self.message)?,
        }
        if let Some(ref response) = self.raw_response {
            state.serialize_field("response", response)?;
        }
        state.end()
    }
}

/// Aggregate of every outcome of one dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub status: Status,
    pub channels_notified: Vec<String>,
    pub timestamp: Timestamp,
    #[serde(serialize_with = "serialize_details")]
    pub details: Vec<ChannelOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    /// Fold outcomes, already in resolved order, into one result
    pub fn from_outcomes(details: Vec<ChannelOutcome>) -> Self {
        let channels_notified: Vec<String> = details
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.channel.clone())
            .collect();

        let (status, error) = if !channels_notified.is_empty() {
            (Status::Success, None)
        } else if details.iter().any(|o| o.attempted) {
            (Status::Error, Some(ALL_CHANNELS_FAILED.to_string()))
        } else {
            (Status::Error, Some(NO_CHANNELS_CONFIGURED.to_string()))
        };

        Self {
            status,
            channels_notified,
            timestamp: Timestamp::now(),
            details,
            error,
        }
    }

    /// Nothing in the resolved set was both enabled and configured
    pub fn is_unconfigured(&self) -> bool {
        self.error.as_deref() == Some(NO_CHANNELS_CONFIGURED)
    }

    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.details.iter().find(|o| o.channel == channel)
    }
}

fn serialize_details<S: Serializer>(details: &[ChannelOutcome], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(details.len()))?;
    for outcome in details {
        map.serialize_entry(&outcome.channel, outcome)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_success() {
        let result = DispatchResult::from_outcomes(vec![
            ChannelOutcome::success("slack", "sent", None),
            ChannelOutcome::failure("line", "LINE API error: HTTP 401"),
        ]);

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.channels_notified, vec!["slack"]);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_all_failed_vs_unconfigured() {
        let failed = DispatchResult::from_outcomes(vec![
            ChannelOutcome::failure("slack", "boom"),
            ChannelOutcome::not_configured("line"),
        ]);
        assert_eq!(failed.error.as_deref(), Some(ALL_CHANNELS_FAILED));
        assert!(!failed.is_unconfigured());

        let unconfigured = DispatchResult::from_outcomes(vec![ChannelOutcome::not_configured("line")]);
        assert!(unconfigured.is_unconfigured());

        let empty = DispatchResult::from_outcomes(Vec::new());
        assert_eq!(empty.status, Status::Error);
        assert!(empty.is_unconfigured());
    }

    #[test]
    fn test_wire_shape() {
        let result = DispatchResult::from_outcomes(vec![
            ChannelOutcome::success("slack", "Slack message sent successfully", Some(json!({"ts": "1"}))),
            ChannelOutcome::not_configured("feishu"),
        ]);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["channels_notified"], json!(["slack"]));
        assert_eq!(
            value["details"]["slack"],
            json!({"status": "success", "message": "Slack message sent successfully", "response": {"ts": "1"}})
        );
        assert_eq!(
            value["details"]["feishu"],
            json!({"status": "error", "error": "feishu not configured"})
        );
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].is_string());
    }
}
