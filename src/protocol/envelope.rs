//! Wire envelopes for the line-oriented JSON-RPC protocol.
//!
//! Outbound messages carry `protocolVersion`; inbound messages may use
//! `jsonrpc` instead.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::error::AppError;

pub const PROTOCOL_VERSION: &str = "2.0";

/// Id the startup announcement is sent with
pub const ANNOUNCEMENT_ID: &str = "init";

/// A routed request. `id: None` marks a fire-and-forget notification.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Value,
    pub id: Option<Value>,
}

/// Result of decoding one inbound line
#[derive(Debug)]
pub enum Inbound {
    Request(RpcRequest),
    /// A message without `method`, e.g. the peer answering our announcement
    PeerMessage { id: Option<Value> },
    /// Undecodable or structurally wrong; answered with an error when the
    /// id is known or the line was not JSON at all
    Invalid { id: Option<Value>, error: AppError },
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default, rename = "protocolVersion", alias = "jsonrpc")]
    protocol_version: Option<Value>,
    #[serde(default)]
    method: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
}

/// Keeps an explicit `"id": null` distinct from a missing id
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Inbound {
    pub fn decode(line: &str) -> Self {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Inbound line is not JSON");
                return Inbound::Invalid {
                    id: None,
                    error: AppError::Parse {
                        message: "Invalid JSON input".to_string(),
                    },
                };
            }
        };

        if !value.is_object() {
            return Inbound::Invalid {
                id: None,
                error: AppError::InvalidRequest {
                    message: "Expected a JSON object".to_string(),
                },
            };
        }

        let id_hint = value.get("id").cloned();
        let raw: RawMessage = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                return Inbound::Invalid {
                    id: id_hint,
                    error: AppError::InvalidRequest {
                        message: e.to_string(),
                    },
                };
            }
        };

        if let Some(version) = raw.protocol_version {
            if version.as_str() != Some(PROTOCOL_VERSION) {
                return Inbound::Invalid {
                    id: raw.id,
                    error: AppError::InvalidRequest {
                        message: format!("Unsupported protocol version {}", version),
                    },
                };
            }
        }

        match raw.method {
            None => Inbound::PeerMessage { id: raw.id },
            Some(Value::String(method)) => Inbound::Request(RpcRequest {
                method,
                params: raw.params.unwrap_or(Value::Null),
                id: raw.id,
            }),
            Some(other) => Inbound::Invalid {
                id: raw.id,
                error: AppError::InvalidRequest {
                    message: format!("Method must be a string, got {}", other),
                },
            },
        }
    }
}

/// Error member of a response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&AppError> for RpcError {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.rpc_code(),
            message: error.to_string(),
            data: error.rpc_data(),
        }
    }
}

/// Exactly one of `result` / `error` is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<Value>, error: &AppError) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            result: None,
            error: Some(RpcError::from(error)),
            id: id.unwrap_or(Value::Null),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Capabilities advertised at startup and by `initialize`
pub fn capabilities() -> Value {
    json!({ "notification": true, "multiChannel": true })
}

/// First line written on startup
pub fn announcement() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "method": "initialize",
        "params": { "capabilities": capabilities() },
        "id": ANNOUNCEMENT_ID,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_request_with_jsonrpc_alias() {
        let inbound = Inbound::decode(r#"{"jsonrpc":"2.0","method":"health","id":7}"#);
        match inbound {
            Inbound::Request(req) => {
                assert_eq!(req.method, "health");
                assert_eq!(req.id, Some(json!(7)));
                assert_eq!(req.params, Value::Null);
            }
            other => panic!("Expected request, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_distinguishes_null_and_missing_id() {
        let Inbound::Request(with_null) = Inbound::decode(r#"{"method":"health","id":null}"#) else {
            panic!("Expected request");
        };
        assert_eq!(with_null.id, Some(Value::Null));

        let Inbound::Request(missing) = Inbound::decode(r#"{"method":"health"}"#) else {
            panic!("Expected request");
        };
        assert_eq!(missing.id, None);
    }

    #[test]
    fn test_decode_parse_error() {
        let Inbound::Invalid { id, error } = Inbound::decode("{not json") else {
            panic!("Expected invalid");
        };
        assert!(id.is_none());
        assert_eq!(error.rpc_code(), -32700);
    }

    #[test]
    fn test_decode_wrong_version() {
        let Inbound::Invalid { id, error } =
            Inbound::decode(r#"{"protocolVersion":"1.0","method":"health","id":"a"}"#)
        else {
            panic!("Expected invalid");
        };
        assert_eq!(id, Some(json!("a")));
        assert_eq!(error.rpc_code(), -32600);
    }

    #[test]
    fn test_decode_peer_message() {
        let inbound = Inbound::decode(r#"{"protocolVersion":"2.0","result":{},"id":"init"}"#);
        assert!(matches!(inbound, Inbound::PeerMessage { id: Some(_) }));
    }

    #[test]
    fn test_decode_non_object() {
        let inbound = Inbound::decode("[1,2,3]");
        assert!(matches!(inbound, Inbound::Invalid { ref error, .. } if error.rpc_code() == -32600));
    }

    #[test]
    fn test_response_serialization() {
        let ok = RpcResponse::success(json!(1), json!({"status": "healthy"}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"protocolVersion": "2.0", "result": {"status": "healthy"}, "id": 1})
        );

        let err = RpcResponse::failure(
            None,
            &AppError::MethodNotFound {
                method: "explode".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "protocolVersion": "2.0",
                "error": {"code": -32601, "message": "Method explode not supported"},
                "id": null
            })
        );
    }

    #[test]
    fn test_announcement_shape() {
        let value = announcement();
        assert_eq!(value["method"], "initialize");
        assert_eq!(value["id"], "init");
        assert_eq!(value["params"]["capabilities"]["multiChannel"], true);
    }
}
