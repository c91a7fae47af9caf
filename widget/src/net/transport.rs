use std::time::Duration;

use wire::{ChatRequest, ChatResponse, SearchRequest, SearchResponse};

/// Errors produced by a transport. The widget never shows these to the
/// user; they are logged and mapped to a fixed fallback.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    /// The body did not match the expected JSON shape.
    #[error("malformed response: {0}")]
    Parse(#[from] wire::WireError),

    /// No response arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Sends one chat question and returns the backend's reply.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Runs one search query.
#[async_trait::async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError>;
}
