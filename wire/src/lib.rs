//! Shared HTTP contract for the chat and search backends.
//!
//! This crate owns the JSON bodies exchanged between the widget core and the
//! backend. Request types are serialize-only in spirit; response types are
//! lenient about extra fields because the backend returns more metadata than
//! the widget consumes.

use serde::{Deserialize, Serialize};

/// Error returned by the `decode_*` helpers.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The body was not valid JSON or did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// A field the widget relies on was present but empty.
    #[error("response field `{0}` is empty")]
    EmptyField(&'static str),
}

// =============================================================================
// CHAT
// =============================================================================

/// Author of a conversation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One prior conversation entry replayed to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /chatbot/query`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Raw user text, already trimmed.
    pub question: String,
    /// Opaque conversation token.
    pub conversation_id: String,
    /// Prior messages in display order. Omitted unless history replay is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

/// Body returned by `POST /chatbot/query`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Replacement conversation token, when the backend assigns one.
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

/// Body returned by `GET /chatbot/health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Result ordering requested from the search backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    Title,
}

impl SortBy {
    /// Parse a filter value; unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "relevance" => Some(Self::Relevance),
            "date" => Some(Self::Date),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
            Self::Title => "title",
        }
    }
}

/// Body of `POST /api/search`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Document type filter (`"pdf"`, `"docx"`, ...). `null` means all types.
    #[serde(rename = "docType")]
    pub doc_type: Option<String>,
    #[serde(default, rename = "sortBy")]
    pub sort_by: SortBy,
}

/// A single ranked hit. Ranking and scoring are entirely backend-owned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Relevance in `0.0..=1.0`.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Body returned by `POST /api/search`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a chat reply body.
///
/// # Errors
///
/// Returns [`WireError::Decode`] when the body is not a JSON object carrying
/// a string `response`, and [`WireError::EmptyField`] when that string is
/// blank.
pub fn decode_chat_response(body: &str) -> Result<ChatResponse, WireError> {
    let reply: ChatResponse = serde_json::from_str(body)?;
    if reply.response.trim().is_empty() {
        return Err(WireError::EmptyField("response"));
    }
    Ok(reply)
}

/// Decode a search reply body. A body without `results` decodes as empty.
///
/// # Errors
///
/// Returns [`WireError::Decode`] for malformed JSON.
pub fn decode_search_response(body: &str) -> Result<SearchResponse, WireError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a health check body.
///
/// # Errors
///
/// Returns [`WireError::Decode`] for malformed JSON.
pub fn decode_health_response(body: &str) -> Result<HealthResponse, WireError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
