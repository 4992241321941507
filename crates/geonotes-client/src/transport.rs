// ABOUTME: HTTP transport with a hard per-request deadline
// ABOUTME: Maps reqwest failures, non-2xx statuses, and bad JSON into NotesError

use crate::config::ClientConfig;
use crate::error::{NotesError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Executes single JSON requests against the configured base address.
///
/// Every call races the whole exchange (connect, send, body read) against
/// the configured timeout. Holds no state between calls beyond the pooled
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| NotesError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Self::with_client(client, config)
    }

    /// Reuse an existing `reqwest::Client` (shares its connection pool).
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one request.
    ///
    /// Returns `Ok(None)` for 204 (or an empty success body), the decoded
    /// JSON otherwise. `headers` are merged over the JSON defaults.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Value>> {
        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.exchange(path, &method, body, headers)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    method = %method,
                    path,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request timed out"
                );
                Err(NotesError::Timeout {
                    after_ms: self.timeout_ms(),
                })
            }
        }
    }

    async fn exchange(
        &self,
        path: &str,
        method: &Method,
        body: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Value>> {
        let started = Instant::now();
        let url = join_url(&self.base_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(merged_headers(headers));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotesError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| NotesError::MalformedResponse(format!("{method} {path}: {e}")))
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    fn classify(&self, err: reqwest::Error) -> NotesError {
        if err.is_timeout() {
            NotesError::Timeout {
                after_ms: self.timeout_ms(),
            }
        } else if err.is_builder() {
            NotesError::Config(err.to_string())
        } else {
            NotesError::NetworkUnreachable(err.to_string())
        }
    }
}

/// Base address plus an absolute path, with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn merged_headers(extra: Option<&HeaderMap>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(extra) = extra {
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }
    }
    headers
}
