//! Chat widget state machine.
//!
//! States: `Idle` -> (submit accepted) -> `AwaitingResponse` -> (settled) ->
//! `Idle`. There is no transition from `AwaitingResponse` to itself: a submit
//! while pending is ignored, never queued.
//!
//! Invariant: every accepted submit appends exactly one user message and,
//! once settled, exactly one assistant message (the reply or the fallback).

use wire::{ChatRequest, ChatResponse, Role};

use super::conversation::{Conversation, Message};

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Collapsed,
    Expanded,
}

impl Visibility {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    #[must_use]
    pub fn is_expanded(self) -> bool {
        self == Self::Expanded
    }
}

/// Occupancy of the single pending-request slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Why a submit was ignored. Neither case is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    /// Text was empty after trimming.
    Empty,
    /// A request is already in flight.
    Pending,
}

/// An accepted submit: the user message that was appended and the request
/// to send for it.
#[derive(Clone, Debug)]
pub struct PendingSend {
    pub user_message: Message,
    pub request: ChatRequest,
}

/// How an in-flight request ended.
#[derive(Clone, Debug)]
pub enum Settlement {
    Reply(ChatResponse),
    /// Transport failure, bad status, malformed body, timeout, or cancellation.
    Failed,
}

/// Result of settling the pending slot.
#[derive(Clone, Debug)]
pub struct Settled {
    /// The assistant message that was appended.
    pub message: Message,
    /// True when the fallback text was used.
    pub fell_back: bool,
    pub token_changed: bool,
    /// Suggestions the reply carried, empty when none.
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct WidgetState {
    visibility: Visibility,
    phase: Phase,
    conversation: Conversation,
    input: String,
    suggestions: Vec<String>,
    send_history: bool,
}

impl WidgetState {
    #[must_use]
    pub fn new(conversation: Conversation, send_history: bool) -> Self {
        Self {
            visibility: Visibility::Collapsed,
            phase: Phase::Idle,
            conversation,
            input: String::new(),
            suggestions: Vec::new(),
            send_history,
        }
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The input accepts submissions only while no request is pending.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// The typing indicator is shown exactly while awaiting a response.
    #[must_use]
    pub fn typing_visible(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    /// Replace the input text. The input is disabled while a request is
    /// pending, so edits are dropped then. Returns whether the text was set.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.phase == Phase::AwaitingResponse {
            return false;
        }
        self.input = text.into();
        true
    }

    /// Flip visibility. Never touches the conversation.
    pub fn toggle(&mut self) -> Visibility {
        self.visibility = self.visibility.toggled();
        self.visibility
    }

    /// Returns whether the visibility changed.
    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        let changed = self.visibility != visibility;
        self.visibility = visibility;
        changed
    }

    /// Accept a submit: append the user message, clear the input, and occupy
    /// the pending slot.
    ///
    /// # Errors
    ///
    /// Returns [`Ignored::Pending`] while a request is in flight and
    /// [`Ignored::Empty`] for blank text. In both cases nothing changes.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingSend, Ignored> {
        if self.phase == Phase::AwaitingResponse {
            return Err(Ignored::Pending);
        }
        let question = text.trim();
        if question.is_empty() {
            return Err(Ignored::Empty);
        }

        let history = self.send_history.then(|| self.conversation.history());
        let user_message = self.conversation.push(Role::User, question).clone();
        self.input.clear();
        self.phase = Phase::AwaitingResponse;

        let request = ChatRequest {
            question: question.to_owned(),
            conversation_id: self.conversation.token().to_owned(),
            history,
        };
        Ok(PendingSend { user_message, request })
    }

    /// Release the pending slot and append the assistant message.
    ///
    /// Returns `None` when no request is pending, so a stray settlement can
    /// never append a second reply.
    pub fn settle(&mut self, settlement: Settlement, fallback: &str) -> Option<Settled> {
        if self.phase != Phase::AwaitingResponse {
            return None;
        }
        self.phase = Phase::Idle;

        let settled = match settlement {
            Settlement::Reply(reply) => {
                let token_changed = reply
                    .conversation_id
                    .as_deref()
                    .is_some_and(|token| self.conversation.adopt_token(token));
                if !reply.suggested_questions.is_empty() {
                    self.suggestions.clone_from(&reply.suggested_questions);
                }
                let message = self.conversation.push(Role::Assistant, reply.response).clone();
                Settled { message, fell_back: false, token_changed, suggestions: reply.suggested_questions }
            }
            Settlement::Failed => {
                let message = self.conversation.push(Role::Assistant, fallback).clone();
                Settled { message, fell_back: true, token_changed: false, suggestions: Vec::new() }
            }
        };
        Some(settled)
    }
}
