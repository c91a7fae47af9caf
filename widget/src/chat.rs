//! Chat widget controller.
//!
//! DESIGN
//! ======
//! `ChatWidget` binds a [`WidgetState`] to a transport and a surface. State
//! lives behind a `std::sync::Mutex` that is never held across an await, so
//! a clone of the widget handed to an event loop can observe the pending
//! slot while a request is in flight and a second submit is rejected rather
//! than queued.
//!
//! The pending slot is released by [`InFlight`], a guard that settles the
//! request on drop. A dropped future, a panicking transport, or a timeout
//! all end with the slot released and exactly one assistant message.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::timeout;

use crate::config::WidgetConfig;
use crate::net::{ChatTransport, TransportError};
use crate::render::{TypingIndicatorView, render_greeting, render_message};
use crate::state::{Conversation, Ignored, Message, Phase, Settled, Settlement, Visibility, WidgetState};
use crate::surface::ChatSurface;

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

/// Keys the widget reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

/// User interactions a host forwards to the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetEvent {
    ToggleClicked,
    CloseClicked,
    SendClicked,
    InputChanged(String),
    KeyPressed { key: Key, shift: bool },
    SuggestionClicked(usize),
}

/// What a submit attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent.
    Ignored(Ignored),
    /// The backend replied and the reply was appended.
    Replied,
    /// The request failed and the fallback message was appended.
    FellBack,
}

pub struct ChatWidget<T, S> {
    config: Arc<WidgetConfig>,
    state: Arc<Mutex<WidgetState>>,
    transport: Arc<T>,
    surface: Arc<S>,
}

impl<T, S> Clone for ChatWidget<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            surface: Arc::clone(&self.surface),
        }
    }
}

impl<T: ChatTransport, S: ChatSurface> ChatWidget<T, S> {
    /// Create a widget with a fresh conversation.
    pub fn new(config: WidgetConfig, transport: T, surface: S) -> Self {
        Self::with_conversation(config, Conversation::new(), transport, surface)
    }

    pub fn with_conversation(config: WidgetConfig, conversation: Conversation, transport: T, surface: S) -> Self {
        let mut state = WidgetState::new(conversation, config.send_history);
        state.set_suggestions(config.suggested_questions.clone());
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
            transport: Arc::new(transport),
            surface: Arc::new(surface),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.lock().visibility()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.lock().conversation().messages().to_vec()
    }

    #[must_use]
    pub fn conversation_token(&self) -> String {
        self.lock().conversation().token().to_owned()
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.lock().input().to_owned()
    }

    /// Render the greeting and static suggestions, then auto-open if
    /// configured. The greeting is display-only and never enters the log.
    pub fn mount(&self) {
        let (visibility, suggestions) = {
            let state = self.lock();
            (state.visibility(), state.suggestions().to_vec())
        };
        self.surface.set_expanded(visibility.is_expanded());
        self.surface.append_message(&render_greeting(&self.config.subtitle));
        if !suggestions.is_empty() {
            self.surface.show_suggestions(&suggestions);
        }
        if self.config.auto_open {
            self.open();
        }
    }

    /// Flip visibility; expanding focuses the input.
    pub fn toggle(&self) -> Visibility {
        let visibility = self.lock().toggle();
        self.apply_visibility(visibility);
        visibility
    }

    pub fn open(&self) {
        if self.lock().set_visibility(Visibility::Expanded) {
            self.apply_visibility(Visibility::Expanded);
        }
    }

    pub fn close(&self) {
        if self.lock().set_visibility(Visibility::Collapsed) {
            self.apply_visibility(Visibility::Collapsed);
        }
    }

    /// Replace the input text. Dropped while a request is pending.
    pub fn set_input(&self, text: impl Into<String>) -> bool {
        self.lock().set_input(text)
    }

    /// Submit whatever is currently in the input.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.input();
        self.submit(&text).await
    }

    /// Programmatic send through the same guard as a user send. Text sent
    /// while a request is pending is dropped, never left in the input.
    pub async fn send_message(&self, text: &str) -> SubmitOutcome {
        self.submit(text).await
    }

    /// Submit `text`.
    ///
    /// Blank text and submits while a request is pending are ignored. An
    /// accepted submit appends the user message before any network I/O,
    /// issues exactly one request, and always ends with one assistant
    /// message and the pending slot released.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let pending = {
            let mut state = self.lock();
            match state.begin_submit(text) {
                Ok(pending) => pending,
                Err(reason) => {
                    if self.config.debug {
                        tracing::debug!(?reason, "submit ignored");
                    }
                    return SubmitOutcome::Ignored(reason);
                }
            }
        };

        self.surface.append_message(&render_message(&pending.user_message));
        self.surface.clear_input();
        self.surface.set_input_enabled(false);
        self.surface.show_typing(&TypingIndicatorView);

        let guard = InFlight::new(self);
        let conversation_id = pending.request.conversation_id.clone();
        if self.config.debug {
            tracing::debug!(endpoint = %self.config.api_url, %conversation_id, "sending chat request");
        }

        let limit = self.config.request_timeout();
        let result = match timeout(limit, self.transport.send_chat(&pending.request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(limit)),
        };

        let settlement = match result {
            Ok(reply) => {
                if self.config.debug {
                    tracing::debug!(%conversation_id, intent = ?reply.intent, "chat reply received");
                }
                Settlement::Reply(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, %conversation_id, "chat request failed");
                Settlement::Failed
            }
        };

        match guard.finish(settlement) {
            Some(settled) if !settled.fell_back => SubmitOutcome::Replied,
            _ => SubmitOutcome::FellBack,
        }
    }

    /// Dispatch one host event. Returns the submit outcome for events that
    /// submit.
    pub async fn handle_event(&self, event: WidgetEvent) -> Option<SubmitOutcome> {
        match event {
            WidgetEvent::ToggleClicked => {
                self.toggle();
                None
            }
            WidgetEvent::CloseClicked | WidgetEvent::KeyPressed { key: Key::Escape, .. } => {
                self.close();
                None
            }
            WidgetEvent::InputChanged(text) => {
                if !self.set_input(text) && self.config.debug {
                    tracing::debug!("input change dropped while awaiting response");
                }
                None
            }
            WidgetEvent::SendClicked | WidgetEvent::KeyPressed { key: Key::Enter, shift: false } => {
                Some(self.submit_input().await)
            }
            WidgetEvent::KeyPressed { .. } => None,
            WidgetEvent::SuggestionClicked(index) => {
                let suggestion = self.lock().suggestions().get(index).cloned()?;
                Some(self.submit(&suggestion).await)
            }
        }
    }

    fn apply_visibility(&self, visibility: Visibility) {
        self.surface.set_expanded(visibility.is_expanded());
        if visibility.is_expanded() {
            self.surface.focus_input();
        }
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// IN-FLIGHT GUARD
// =============================================================================

/// Owns the occupied pending slot until the request settles.
struct InFlight<'a, S: ChatSurface> {
    state: &'a Mutex<WidgetState>,
    surface: &'a S,
    fallback: &'static str,
    done: bool,
}

impl<'a, S: ChatSurface> InFlight<'a, S> {
    fn new<T: ChatTransport>(widget: &'a ChatWidget<T, S>) -> Self {
        Self {
            state: widget.state.as_ref(),
            surface: widget.surface.as_ref(),
            fallback: widget.config.language.strings().fallback_reply,
            done: false,
        }
    }

    fn finish(mut self, settlement: Settlement) -> Option<Settled> {
        self.done = true;
        self.settle(settlement)
    }

    fn settle(&self, settlement: Settlement) -> Option<Settled> {
        let settled = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .settle(settlement, self.fallback)?;

        self.surface.hide_typing();
        self.surface.append_message(&render_message(&settled.message));
        self.surface.set_input_enabled(true);
        self.surface.focus_input();
        if !settled.suggestions.is_empty() {
            self.surface.show_suggestions(&settled.suggestions);
        }
        Some(settled)
    }
}

impl<S: ChatSurface> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if !self.done {
            tracing::warn!("chat request abandoned before settling; releasing pending slot");
            self.settle(Settlement::Failed);
        }
    }
}
