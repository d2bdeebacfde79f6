//! Line-oriented stdio server.
//!
//! Writes the capability announcement, then answers one request per line
//! until EOF. Each request is fully processed before the next line is read.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::envelope::{RpcResponse, announcement};
use super::handler::ProtocolHandler;
use crate::error::AppError;

pub struct StdioServer<R, W> {
    handler: Arc<ProtocolHandler>,
    reader: R,
    writer: W,
}

impl StdioServer<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Server bound to the process stdin/stdout
    pub fn stdio(handler: Arc<ProtocolHandler>) -> Self {
        Self::new(handler, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> StdioServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(handler: Arc<ProtocolHandler>, reader: R, writer: W) -> Self {
        Self {
            handler,
            reader,
            writer,
        }
    }

    /// Serve until the input closes
    ///
    /// # Errors
    /// Returns an error only when writing to the output fails; bad input is
    /// answered on the wire and never stops the loop.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            handler,
            mut reader,
            mut writer,
        } = self;

        write_message(&mut writer, &announcement()).await?;
        tracing::info!("Protocol server ready");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    tracing::info!("Input closed, shutting down");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Error reading input");
                    break;
                }
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::debug!(error = %e, "Input line is not UTF-8");
                    let error = AppError::Parse {
                        message: "Input is not valid UTF-8".to_string(),
                    };
                    write_message(&mut writer, &RpcResponse::failure(None, &error)).await?;
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }
            tracing::trace!(raw = %line, "peer -> relay");

            if let Some(response) = handler.handle_line(line).await {
                write_message(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_message<W, T>(writer: &mut W, message: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut payload = serde_json::to_string(message).context("Failed to encode message")?;
    tracing::trace!(raw = %payload, "relay -> peer");
    payload.push('\n');

    writer
        .write_all(payload.as_bytes())
        .await
        .context("Failed to write to output")?;
    writer.flush().await.context("Failed to flush output")?;
    Ok(())
}
