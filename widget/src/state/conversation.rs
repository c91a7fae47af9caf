//! Conversation log and token.
//!
//! The log is append-only; insertion order is the display order and the
//! order replayed to the backend. Appending is crate-private so only the
//! state machine in `widget` can add entries.

use rand::Rng;
use rand::distr::Alphanumeric;
use wire::{HistoryEntry, Role};

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

const TOKEN_PREFIX: &str = "conv-";
const TOKEN_RANDOM_LEN: usize = 9;

/// Generate a fresh client-side conversation token, e.g. `conv-k3j9x0q2a`.
#[must_use]
pub fn generate_token() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{TOKEN_PREFIX}{suffix}")
}

/// A single immutable conversation entry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), role, content: content.into() }
    }
}

#[derive(Clone, Debug)]
pub struct Conversation {
    token: String,
    messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Start an empty conversation with a freshly generated token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_token(generate_token())
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: token.into(), messages: Vec::new() }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Replace the token with a server-assigned one. Blank tokens are
    /// ignored. Returns whether the token changed.
    pub fn adopt_token(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() || token == self.token {
            return false;
        }
        token.clone_into(&mut self.token);
        true
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The log as backend history entries, in order.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|m| HistoryEntry { role: m.role, content: m.content.clone() })
            .collect()
    }

    pub(crate) fn push(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.messages.push(Message::new(role, content));
        &self.messages[self.messages.len() - 1]
    }
}
