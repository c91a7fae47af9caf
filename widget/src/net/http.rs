//! `reqwest`-backed transport.
//!
//! Thin HTTP wrapper: POST the JSON body, require a 2xx status, then hand
//! the text to the pure decoders in `wire`.

use std::time::Duration;

use serde::Serialize;
use wire::{ChatRequest, ChatResponse, HealthResponse, SearchRequest, SearchResponse};

use super::transport::{ChatTransport, SearchTransport, TransportError};

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP transport bound to a single endpoint URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport for `endpoint` with an overall request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET` the backend health endpoint derived from this transport's URL.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for network failures, non-2xx statuses,
    /// and malformed bodies.
    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        let response = self
            .http
            .get(health_url(&self.endpoint))
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let text = read_success_body(response).await?;
        Ok(wire::decode_health_response(&text)?)
    }

    async fn post_json<B: Serialize + Sync>(&self, body: &B) -> Result<String, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        read_success_body(response).await
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, TransportError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(TransportError::Status { status: status.as_u16(), body: text });
    }
    Ok(text)
}

/// Health URL for a chat endpoint: a trailing `/query` segment is replaced
/// by `/health`, otherwise `/health` is appended.
#[must_use]
pub fn health_url(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    match base.strip_suffix("/query") {
        Some(prefix) => format!("{prefix}/health"),
        None => format!("{base}/health"),
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let text = self.post_json(request).await?;
        Ok(wire::decode_chat_response(&text)?)
    }
}

#[async_trait::async_trait]
impl SearchTransport for HttpTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        let text = self.post_json(request).await?;
        Ok(wire::decode_search_response(&text)?)
    }
}
