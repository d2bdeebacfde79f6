//! Drives the stdio protocol end to end with spy adapters in place of the
//! real backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use notify_relay::channels::{ChannelAdapter, ChannelRegistry, Delivery};
use notify_relay::config::Settings;
use notify_relay::dispatch::Dispatcher;
use notify_relay::error::{AppError, AppResult};
use notify_relay::protocol::{ProtocolHandler, StdioServer};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

struct SpyAdapter {
    id: &'static str,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChannelAdapter for SpyAdapter {
    fn name(&self) -> &'static str {
        self.id
    }

    fn missing_credentials(&self) -> Vec<&'static str> {
        Vec::new()
    }

    async fn send_notification(
        &self,
        _recipient: Option<&str>,
        message: &str,
        _title: Option<&str>,
    ) -> AppResult<Delivery> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AppError::backend(self.id, format!("{} unavailable", self.id)))
        } else {
            Ok(Delivery::new(format!("{} delivered: {}", self.id, message)))
        }
    }
}

struct Fixture {
    handler: Arc<ProtocolHandler>,
    calls: Vec<(&'static str, Arc<AtomicUsize>)>,
}

impl Fixture {
    /// `(id, enabled, fail)` per channel
    fn new(channels: &[(&'static str, bool, bool)]) -> Self {
        let mut registry = ChannelRegistry::new();
        let mut calls = Vec::new();
        for (id, enabled, fail) in channels {
            let counter = Arc::new(AtomicUsize::new(0));
            registry.register(
                *enabled,
                None,
                Arc::new(SpyAdapter {
                    id: *id,
                    fail: *fail,
                    calls: counter.clone(),
                }),
            );
            calls.push((*id, counter));
        }

        let settings = Arc::new(Settings::default());
        let dispatcher = Dispatcher::new(Arc::new(registry), &settings.relay);
        Self {
            handler: Arc::new(ProtocolHandler::new(settings, dispatcher)),
            calls,
        }
    }

    fn calls(&self, id: &str) -> usize {
        self.calls
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, n)| n.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Feed every line, close stdin, return every line written
    async fn run(&self, lines: &[&str]) -> Vec<Value> {
        let mut input = lines.join("\n");
        input.push('\n');

        let mut output = Vec::new();
        StdioServer::new(
            self.handler.clone(),
            std::io::Cursor::new(input.into_bytes()),
            &mut output,
        )
        .run()
        .await
        .expect("server should stop cleanly at EOF");

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).expect("every output line is JSON"))
            .collect()
    }
}

#[tokio::test]
async fn multi_skips_disabled_channels() {
    let fixture = Fixture::new(&[("slack", true, false), ("line", false, false)]);
    let out = fixture
        .run(&[r#"{"protocolVersion":"2.0","method":"notify","params":{"message":"deploy done","channels":["multi"]},"id":1}"#])
        .await;

    assert_eq!(out.len(), 2);
    let result = &out[1]["result"];
    assert_eq!(out[1]["id"], 1);
    assert_eq!(result["status"], "success");
    assert_eq!(result["channels_notified"], json!(["slack"]));
    assert_eq!(result["details"]["slack"]["status"], "success");
    assert!(result["details"].get("line").is_none());
    assert_eq!(fixture.calls("line"), 0);
}

#[tokio::test]
async fn failing_channel_does_not_block_siblings() {
    let fixture = Fixture::new(&[
        ("slack", true, true),
        ("line", true, false),
        ("feishu", true, false),
    ]);
    let out = fixture
        .run(&[r#"{"jsonrpc":"2.0","method":"notify","params":{"message":"m","channels":[]},"id":"n"}"#])
        .await;

    let result = &out[1]["result"];
    assert_eq!(result["status"], "success");
    assert_eq!(result["channels_notified"], json!(["line", "feishu"]));
    assert_eq!(result["details"]["slack"]["error"], "slack unavailable");
    for id in ["slack", "line", "feishu"] {
        assert_eq!(fixture.calls(id), 1, "{id} should be attempted once");
    }
}

#[tokio::test]
async fn garbage_line_is_answered_and_loop_continues() {
    let fixture = Fixture::new(&[("slack", true, false)]);
    let out = fixture
        .run(&[
            "{not json",
            "",
            r#"{"protocolVersion":"2.0","method":"health","id":2}"#,
        ])
        .await;

    assert_eq!(out.len(), 3);
    assert_eq!(out[1]["error"]["code"], -32700);
    assert_eq!(out[1]["id"], Value::Null);
    assert_eq!(out[2]["result"]["status"], "healthy");
}

#[tokio::test]
async fn unknown_channels_report_no_channels_configured() {
    let fixture = Fixture::new(&[("slack", true, false)]);
    let out = fixture
        .run(&[r#"{"protocolVersion":"2.0","method":"notify","params":{"message":"m","channels":["nonexistent"]},"id":3}"#])
        .await;

    let error = &out[1]["error"];
    assert_eq!(error["code"], -32000);
    assert_eq!(error["data"]["error"], "No channels configured");
    assert_eq!(error["data"]["channels_notified"], json!([]));
    assert_eq!(fixture.calls("slack"), 0);
}

#[tokio::test]
async fn empty_message_is_rejected_before_any_send() {
    let fixture = Fixture::new(&[("slack", true, false)]);
    let out = fixture
        .run(&[r#"{"protocolVersion":"2.0","method":"notify","params":{"message":""},"id":4}"#])
        .await;

    assert_eq!(out[1]["error"]["code"], -32602);
    assert_eq!(fixture.calls("slack"), 0);
}

#[tokio::test]
async fn notifications_without_id_still_run_but_get_no_response() {
    let fixture = Fixture::new(&[("slack", true, false)]);
    let out = fixture
        .run(&[
            r#"{"protocolVersion":"2.0","method":"notify","params":{"message":"a"}}"#,
            r#"{"protocolVersion":"2.0","method":"notify","params":{"message":"a"}}"#,
        ])
        .await;

    assert_eq!(out.len(), 1, "only the announcement is written");
    assert_eq!(fixture.calls("slack"), 2, "identical requests are not deduplicated");
}

#[tokio::test]
async fn interactive_session_over_duplex_pipe() {
    let fixture = Fixture::new(&[("slack", true, false)]);
    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, mut client_write) = tokio::io::split(client);

    let task = tokio::spawn(
        StdioServer::new(fixture.handler.clone(), BufReader::new(server_read), server_write).run(),
    );
    let mut replies = BufReader::new(client_read).lines();

    let announcement: Value =
        serde_json::from_str(&replies.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(announcement["id"], "init");
    assert_eq!(announcement["params"]["capabilities"]["notification"], true);

    client_write
        .write_all(b"{\"protocolVersion\":\"2.0\",\"result\":{},\"id\":\"init\"}\n")
        .await
        .unwrap();
    client_write
        .write_all(b"{\"protocolVersion\":\"2.0\",\"method\":\"initialize\",\"id\":10}\n")
        .await
        .unwrap();

    let reply: Value = serde_json::from_str(&replies.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 10);
    assert_eq!(reply["result"]["initialized"], true);

    client_write
        .write_all(b"{\"protocolVersion\":\"1.0\",\"method\":\"health\",\"id\":11}\n")
        .await
        .unwrap();
    let reply: Value = serde_json::from_str(&replies.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 11);
    assert_eq!(reply["error"]["code"], -32600);

    client_write.shutdown().await.unwrap();
    task.await.unwrap().unwrap();
}
