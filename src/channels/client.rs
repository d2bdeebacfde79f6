use std::time::Duration;

use anyhow::Context;

use crate::error::{AppError, AppResult};

/// Build the HTTP client shared by every adapter
///
/// One client means one connection pool for all backends.
///
/// # Features
/// - **Timeouts**: request timeout from `relay.http_timeout_secs`, connect
///   timeout capped at 10s
/// - **Compression**: gzip
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
pub fn build_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    let timeout = Duration::from_secs(timeout_secs);

    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .use_rustls_tls()
        .user_agent(concat!("notify-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Read a response body as JSON, keeping the raw text when it is not JSON
///
/// # Errors
/// A body that cannot be read in full is a backend error for `channel`.
pub(crate) async fn response_json(
    channel: &str,
    response: reqwest::Response,
) -> AppResult<(reqwest::StatusCode, serde_json::Value)> {
    let status = response.status();
    let text = response.text().await.map_err(|e| {
        tracing::debug!(channel, %status, error = %e, "Failed to read response body");
        AppError::backend(channel, format!("Failed to read response body (HTTP {}): {}", status, e))
    })?;
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    Ok((status, body))
}
